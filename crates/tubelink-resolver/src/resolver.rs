use async_trait::async_trait;
use tubelink_core::{Result, StreamDescriptor, VideoId};

#[async_trait]
pub trait Resolver: Send + Sync + 'static {
    /// Resolves a video id to a playable stream.
    async fn resolve(&self, video_id: &VideoId) -> Result<StreamDescriptor>;
}
