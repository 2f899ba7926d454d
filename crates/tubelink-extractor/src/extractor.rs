use async_trait::async_trait;
use std::sync::Arc;
use tubelink_core::{Result, StreamDescriptor, VideoId};

#[async_trait]
pub trait Extractor: Send + Sync + 'static {
    /// Performs a single resolution attempt for `video_id`.
    ///
    /// Every failure is reported as
    /// [`ResolveError::ResolutionFailed`](tubelink_core::ResolveError::ResolutionFailed);
    /// transient and permanent causes are not told apart.
    async fn extract(&self, video_id: &VideoId) -> Result<StreamDescriptor>;
}

#[async_trait]
impl<T: Extractor + ?Sized> Extractor for Arc<T> {
    async fn extract(&self, video_id: &VideoId) -> Result<StreamDescriptor> {
        (**self).extract(video_id).await
    }
}
