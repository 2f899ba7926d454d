use std::sync::Arc;

use crate::resolver::Resolver;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use tracing::{debug, error, trace, warn};
use tubelink_cache::DescriptorCache;
use tubelink_core::{ResolveError, Result, StreamDescriptor, VideoId};
use tubelink_extractor::Extractor;

/// Resolves video ids through a bounded cache and a retrying extractor.
///
/// A lookup first consults the cache. On a miss the extractor is tried up to
/// [`RetryPolicy::max_attempts`] times with exponential backoff in between.
/// Only successful resolutions are cached, so a failed id is retried from
/// scratch on the next call.
#[derive(Debug)]
pub struct CachedResolver<E, C> {
    extractor: Arc<E>,
    cache: Arc<C>,
    policy: RetryPolicy,
}

impl<E, C> Clone for CachedResolver<E, C> {
    fn clone(&self) -> Self {
        Self {
            extractor: Arc::clone(&self.extractor),
            cache: Arc::clone(&self.cache),
            policy: self.policy.clone(),
        }
    }
}

impl<E: Extractor, C: DescriptorCache> CachedResolver<E, C> {
    /// Creates a resolver that owns `extractor` and `cache`.
    pub fn new(extractor: E, cache: C, policy: RetryPolicy) -> Self {
        Self {
            extractor: Arc::new(extractor),
            cache: Arc::new(cache),
            policy,
        }
    }

    /// Returns a reference to the cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Returns a reference to the extractor.
    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Resolves a video id to a playable stream.
    ///
    /// # Returns
    ///
    /// * `Ok(descriptor)` - From cache, or from the first successful attempt
    /// * `Err(ResolveError::ResolutionExhausted { .. })` - Every attempt failed
    pub async fn resolve(&self, video_id: &VideoId) -> Result<StreamDescriptor> {
        Resolver::resolve(self, video_id).await
    }

    async fn resolve_with_retry(&self, video_id: &VideoId) -> Result<StreamDescriptor> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            let cause = match self.extractor.extract(video_id).await {
                Ok(descriptor) => {
                    debug!(video_id = %video_id, attempt, "resolved stream");
                    return Ok(descriptor);
                }
                Err(err) => {
                    let retryable = err.is_retryable();
                    match err.cause().cloned() {
                        Some(cause) if retryable => cause,
                        _ => return Err(err),
                    }
                }
            };

            if attempt >= max_attempts {
                error!(
                    video_id = %video_id,
                    attempts = attempt,
                    error = %cause,
                    "giving up on stream resolution"
                );
                return Err(ResolveError::ResolutionExhausted {
                    attempts: attempt,
                    cause,
                });
            }

            let delay = self.policy.backoff(attempt);
            warn!(
                video_id = %video_id,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %cause,
                "extraction attempt failed, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl<E: Extractor, C: DescriptorCache> Resolver for CachedResolver<E, C> {
    async fn resolve(&self, video_id: &VideoId) -> Result<StreamDescriptor> {
        trace!(video_id = %video_id, "resolving stream");

        self.cache
            .get_or_compute(video_id, move |id| {
                let id = id.clone();
                async move {
                    trace!(video_id = %id, "cache miss, extracting");
                    self.resolve_with_retry(&id).await
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;
    use tubelink_cache::MokaDescriptorCache;
    use tubelink_core::{CacheError, FailureCause};

    /// Replays scripted outcomes; once the script runs out every call succeeds.
    #[derive(Default)]
    struct ScriptedExtractor {
        script: Mutex<VecDeque<FailureCause>>,
        calls: AtomicUsize,
        call_times: Mutex<Vec<Instant>>,
    }

    impl ScriptedExtractor {
        fn failing_times(n: usize, cause: FailureCause) -> Self {
            let extractor = Self::default();
            extractor
                .script
                .lock()
                .unwrap()
                .extend(std::iter::repeat(cause).take(n));
            extractor
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn gaps(&self) -> Vec<Duration> {
            let times = self.call_times.lock().unwrap();
            times.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    #[async_trait]
    impl Extractor for ScriptedExtractor {
        async fn extract(&self, video_id: &VideoId) -> Result<StreamDescriptor> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.call_times.lock().unwrap().push(Instant::now());
            if let Some(cause) = self.script.lock().unwrap().pop_front() {
                return Err(ResolveError::ResolutionFailed(cause));
            }
            Ok(StreamDescriptor::new(format!("https://cdn.example/{}.m4a", video_id))
                .with_duration(212.0)
                .with_title("Song"))
        }
    }

    // Paused-clock timers fire on millisecond ticks; allow for rounding.
    fn assert_close(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(10),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    fn assert_gaps(actual: Vec<Duration>, expected_secs: &[u64]) {
        assert_eq!(actual.len(), expected_secs.len());
        for (gap, secs) in actual.into_iter().zip(expected_secs) {
            assert_close(gap, Duration::from_secs(*secs));
        }
    }

    fn id(s: &str) -> VideoId {
        VideoId::new(s).unwrap()
    }

    fn unavailable() -> FailureCause {
        FailureCause::Exit {
            status: "exit status: 1".to_string(),
            stderr: "ERROR: Video unavailable".to_string(),
        }
    }

    fn resolver(
        extractor: ScriptedExtractor,
        capacity: u64,
        policy: RetryPolicy,
    ) -> CachedResolver<ScriptedExtractor, MokaDescriptorCache> {
        CachedResolver::new(
            extractor,
            MokaDescriptorCache::with_capacity(capacity),
            policy,
        )
    }

    #[tokio::test]
    async fn resolve_returns_non_empty_url() {
        let resolver = resolver(ScriptedExtractor::default(), 16, RetryPolicy::default());

        let descriptor = resolver.resolve(&id("abc123")).await.unwrap();
        assert!(!descriptor.url.is_empty());
        assert_eq!(descriptor.url, "https://cdn.example/abc123.m4a");
        assert_eq!(descriptor.title.as_deref(), Some("Song"));
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let resolver = resolver(ScriptedExtractor::default(), 16, RetryPolicy::default());

        let first = resolver.resolve(&id("abc123")).await.unwrap();
        let second = resolver.resolve(&id("abc123")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(resolver.extractor().calls(), 1);
    }

    /// Fails every call with an error that retrying cannot fix.
    #[derive(Default)]
    struct BrokenCacheExtractor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Extractor for BrokenCacheExtractor {
        async fn extract(&self, _video_id: &VideoId) -> Result<StreamDescriptor> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ResolveError::Cache(CacheError::Unavailable(
                "connection refused".to_string(),
            )))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_errors_skip_the_backoff_loop() {
        let resolver = CachedResolver::new(
            BrokenCacheExtractor::default(),
            MokaDescriptorCache::with_capacity(16),
            RetryPolicy::default(),
        );
        let started = Instant::now();

        let err = resolver.resolve(&id("abc123")).await.unwrap_err();

        assert!(matches!(err, ResolveError::Cache(CacheError::Unavailable(_))));
        assert_eq!(resolver.extractor().calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn deterministic_failure_exhausts_after_max_attempts() {
        let extractor = ScriptedExtractor::failing_times(100, unavailable());
        let resolver = resolver(extractor, 16, RetryPolicy::default());
        let started = Instant::now();

        let err = resolver.resolve(&id("bad-id")).await.unwrap_err();

        match err {
            ResolveError::ResolutionExhausted { attempts, cause } => {
                assert_eq!(attempts, 3);
                assert_eq!(cause, unavailable());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(resolver.extractor().calls(), 3);
        assert_gaps(resolver.extractor().gaps(), &[1, 2]);
        assert_close(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn configured_attempts_follow_exponential_backoff() {
        let extractor = ScriptedExtractor::failing_times(10, FailureCause::NoStreamUrl);
        let policy = RetryPolicy::builder().max_attempts(5).build();
        let resolver = resolver(extractor, 16, policy);

        resolver.resolve(&id("abc123")).await.unwrap_err();

        assert_eq!(resolver.extractor().calls(), 5);
        assert_gaps(resolver.extractor().gaps(), &[1, 2, 4, 8]);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_recover_and_cache_result() {
        let extractor =
            ScriptedExtractor::failing_times(2, FailureCause::Timeout(Duration::from_secs(60)));
        let resolver = resolver(extractor, 16, RetryPolicy::default());

        let descriptor = resolver.resolve(&id("abc123")).await.unwrap();
        assert_eq!(descriptor.url, "https://cdn.example/abc123.m4a");
        assert_eq!(resolver.extractor().calls(), 3);

        resolver.resolve(&id("abc123")).await.unwrap();
        assert_eq!(resolver.extractor().calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_not_cached() {
        let extractor = ScriptedExtractor::failing_times(3, unavailable());
        let resolver = resolver(extractor, 16, RetryPolicy::default());

        resolver.resolve(&id("abc123")).await.unwrap_err();
        assert_eq!(resolver.extractor().calls(), 3);

        // The script is used up, so a fresh attempt now succeeds.
        let descriptor = resolver.resolve(&id("abc123")).await.unwrap();
        assert_eq!(descriptor.url, "https://cdn.example/abc123.m4a");
        assert_eq!(resolver.extractor().calls(), 4);
    }

    #[tokio::test]
    async fn single_attempt_policy_does_not_sleep() {
        let extractor = ScriptedExtractor::failing_times(1, FailureCause::NoStreamUrl);
        let policy = RetryPolicy::builder()
            .max_attempts(1)
            .base_delay(Duration::from_secs(3600))
            .build();
        let resolver = resolver(extractor, 16, policy);

        let err = resolver.resolve(&id("abc123")).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ResolutionExhausted { attempts: 1, .. }
        ));
    }

    #[tokio::test]
    async fn least_recently_used_entry_is_evicted() {
        let resolver = resolver(ScriptedExtractor::default(), 2, RetryPolicy::default());

        resolver.resolve(&id("a")).await.unwrap();
        resolver.resolve(&id("b")).await.unwrap();
        resolver.cache().run_pending_tasks().await;

        // "a" becomes the most recently used.
        resolver.resolve(&id("a")).await.unwrap();
        resolver.cache().run_pending_tasks().await;
        assert_eq!(resolver.extractor().calls(), 2);

        resolver.resolve(&id("c")).await.unwrap();
        resolver.cache().run_pending_tasks().await;
        assert_eq!(resolver.extractor().calls(), 3);

        // "a" is still cached, "b" has to be extracted again.
        resolver.resolve(&id("a")).await.unwrap();
        assert_eq!(resolver.extractor().calls(), 3);
        resolver.resolve(&id("b")).await.unwrap();
        assert_eq!(resolver.extractor().calls(), 4);
    }

    #[tokio::test]
    async fn concurrent_lookups_for_different_ids_are_independent() {
        let resolver = resolver(ScriptedExtractor::default(), 16, RetryPolicy::default());

        let mut handles = vec![];
        for name in ["one", "two", "three", "four"] {
            let resolver = resolver.clone();
            handles.push(tokio::spawn(async move {
                resolver.resolve(&VideoId::new(name).unwrap()).await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(resolver.extractor().calls(), 4);
    }
}
