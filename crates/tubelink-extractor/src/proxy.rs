//! Per-attempt proxy selection with simple health tracking.
//!
//! Proxies are handed out round-robin. A proxy whose attempt failed is
//! quarantined for a cool-down period and skipped while it lasts. When every
//! proxy is quarantined the one released soonest is used anyway, so a
//! configured pool never silently falls back to a direct connection.

use crate::clock::{Clock, SystemClock};
use jiff::{SignedDuration, Timestamp};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

pub struct ProxyPool {
    proxies: Vec<String>,
    /// Per-proxy end of quarantine, indexed like `proxies`.
    quarantined_until: Mutex<Vec<Option<Timestamp>>>,
    cursor: AtomicUsize,
    cooldown: SignedDuration,
    clock: Box<dyn Clock>,
}

impl ProxyPool {
    /// Creates a pool over `proxies` using the system clock.
    pub fn new(proxies: Vec<String>, cooldown: Duration) -> Self {
        Self::with_clock(proxies, cooldown, SystemClock)
    }

    /// An empty pool; every attempt connects directly.
    pub fn empty() -> Self {
        Self::new(Vec::new(), DEFAULT_COOLDOWN)
    }

    pub fn with_clock(
        proxies: Vec<String>,
        cooldown: Duration,
        clock: impl Clock + 'static,
    ) -> Self {
        let health = vec![None; proxies.len()];
        Self {
            proxies,
            quarantined_until: Mutex::new(health),
            cursor: AtomicUsize::new(0),
            cooldown: SignedDuration::try_from(cooldown).unwrap_or(SignedDuration::MAX),
            clock: Box::new(clock),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Picks the proxy for the next attempt, or `None` for a direct connection.
    pub fn next(&self) -> Option<&str> {
        let len = self.proxies.len();
        if len == 0 {
            return None;
        }

        let now = self.clock.now();
        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % len;
        let health = self.quarantined_until.lock();

        let healthy = (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&i| health[i].map_or(true, |until| until <= now));

        let index = match healthy {
            Some(i) => i,
            None => {
                let i = (0..len).min_by_key(|&i| health[i]).unwrap_or(start);
                debug!(
                    proxy = %self.proxies[i],
                    "all proxies quarantined, using the one released first"
                );
                i
            }
        };

        Some(self.proxies[index].as_str())
    }

    /// Quarantines `proxy` for the configured cool-down.
    pub fn report_failure(&self, proxy: &str) {
        if let Some(i) = self.index_of(proxy) {
            let until = self
                .clock
                .now()
                .checked_add(self.cooldown)
                .unwrap_or(Timestamp::MAX);
            self.quarantined_until.lock()[i] = Some(until);
            warn!(proxy = %proxy, until = %until, "proxy quarantined");
        }
    }

    /// Clears any quarantine on `proxy`.
    pub fn report_success(&self, proxy: &str) {
        if let Some(i) = self.index_of(proxy) {
            self.quarantined_until.lock()[i] = None;
        }
    }

    fn index_of(&self, proxy: &str) -> Option<usize> {
        self.proxies.iter().position(|p| p == proxy)
    }
}

impl Default for ProxyPool {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ProxyPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyPool")
            .field("proxies", &self.proxies)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}
