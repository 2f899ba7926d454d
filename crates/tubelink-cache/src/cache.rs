use async_trait::async_trait;
use std::future::Future;
use tubelink_core::{CacheError, StreamDescriptor, VideoId};

pub type Result<T> = std::result::Result<T, CacheError>;

/// A cache of resolved stream descriptors.
///
/// Keys are [`VideoId`]s. Only successful resolutions are ever stored.
#[async_trait]
pub trait DescriptorCache: Send + Sync + 'static {
    /// Get a descriptor from cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get(&self, id: &VideoId) -> Result<Option<StreamDescriptor>>;

    /// Store a descriptor in cache.
    async fn insert(&self, id: &VideoId, descriptor: &StreamDescriptor) -> Result<()>;

    /// Remove a descriptor from cache. Missing keys are not an error.
    async fn invalidate(&self, id: &VideoId) -> Result<()>;

    /// Get a descriptor from cache, computing and storing it if absent.
    ///
    /// Errors from `fetch` are returned as-is and nothing is stored.
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
        if let Some(descriptor) = self.get(id).await? {
            return Ok(descriptor);
        }
        let descriptor = fetch(id).await?;
        self.insert(id, &descriptor).await?;
        Ok(descriptor)
    }
}
