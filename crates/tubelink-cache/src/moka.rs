use crate::cache::{DescriptorCache, Result};
use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace};
use tubelink_core::{CacheError, StreamDescriptor, VideoId};
use typed_builder::TypedBuilder;

/// Default number of descriptors kept in memory.
pub const DEFAULT_CAPACITY: u64 = 128;

/// An in-memory, bounded, least-recently-used descriptor cache.
///
/// Backed by Moka. Cloning is cheap and clones share the same storage.
#[derive(Debug, Clone)]
pub struct MokaDescriptorCache {
    cache: Cache<String, StreamDescriptor>,
}

impl MokaDescriptorCache {
    /// Creates a cache holding at most [`DEFAULT_CAPACITY`] descriptors.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        CacheConfig::builder().max_capacity(max_capacity).build().into()
    }

    /// Creates a cache whose entries also expire `ttl` after insertion.
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        CacheConfig::builder()
            .max_capacity(max_capacity)
            .ttl(ttl)
            .build()
            .into()
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfig::builder()
    }

    /// Approximate number of live entries.
    ///
    /// Moka applies evictions lazily; call [`run_pending_tasks`](Self::run_pending_tasks)
    /// first when an exact figure matters.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Applies pending reads, writes and evictions.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for MokaDescriptorCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DescriptorCache for MokaDescriptorCache {
    async fn get(&self, id: &VideoId) -> Result<Option<StreamDescriptor>> {
        match self.cache.get(id.as_str()).await {
            Some(descriptor) => {
                debug!(video_id = %id, "cache hit");
                Ok(Some(descriptor))
            }
            None => {
                trace!(video_id = %id, "cache miss");
                Ok(None)
            }
        }
    }

    async fn insert(&self, id: &VideoId, descriptor: &StreamDescriptor) -> Result<()> {
        self.cache
            .insert(id.as_str().to_string(), descriptor.clone())
            .await;
        debug!(video_id = %id, "cached descriptor");
        Ok(())
    }

    async fn invalidate(&self, id: &VideoId) -> Result<()> {
        self.cache.invalidate(id.as_str()).await;
        trace!(video_id = %id, "invalidated descriptor (if present)");
        Ok(())
    }

    async fn get_or_compute<F, Fut, E>(
        &self,
        id: &VideoId,
        fetch: F,
    ) -> std::result::Result<StreamDescriptor, E>
    where
        F: FnOnce(&VideoId) -> Fut + Send,
        Fut: Future<Output = std::result::Result<StreamDescriptor, E>> + Send,
        E: From<CacheError> + Clone + Send + Sync + 'static,
    {
        trace!(video_id = %id, "looking up descriptor with single-flight");

        // Concurrent callers for the same key wait on one `fetch`; errors are
        // handed to every waiter and never stored.
        self.cache
            .try_get_with(id.as_str().to_string(), fetch(id))
            .await
            .map_err(|e| e.as_ref().clone())
    }
}

/// Configuration for creating a [`MokaDescriptorCache`].
#[derive(Debug, TypedBuilder)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold.
    #[builder(default = DEFAULT_CAPACITY)]
    max_capacity: u64,
    /// Time-to-live for cache entries. `None` keeps entries until evicted.
    #[builder(default, setter(strip_option))]
    ttl: Option<Duration>,
}

impl From<CacheConfig> for MokaDescriptorCache {
    fn from(config: CacheConfig) -> Self {
        let mut builder = Cache::builder()
            .max_capacity(config.max_capacity)
            .eviction_policy(EvictionPolicy::lru());

        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }

        MokaDescriptorCache {
            cache: builder.build(),
        }
    }
}
