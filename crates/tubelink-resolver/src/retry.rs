use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MULTIPLIER: u32 = 2;
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// How many times to try an extraction and how long to wait in between.
///
/// The wait after the `n`-th failed attempt is
/// `base_delay * multiplier^(n-1)`, capped at `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct RetryPolicy {
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,
    #[builder(default = DEFAULT_BASE_DELAY)]
    base_delay: Duration,
    #[builder(default = DEFAULT_MULTIPLIER)]
    multiplier: u32,
    #[builder(default = DEFAULT_MAX_DELAY)]
    max_delay: Duration,
}

impl RetryPolicy {
    /// Total attempts, never less than one.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to sleep after failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = self.multiplier.max(1).saturating_pow(exponent);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}
