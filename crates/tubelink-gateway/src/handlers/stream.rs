use crate::error::Result;
use crate::model::StreamResponse;
use crate::state::AppState;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use tracing::info;
use tubelink_core::{ResolveError, VideoId};

pub async fn stream_handler(
    path: std::result::Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<StreamResponse>> {
    // Undecodable segments share the error shape of any other bad id.
    let Path(video_id) = path.map_err(|e| ResolveError::InvalidVideoId(e.body_text()))?;
    let video_id = VideoId::new(video_id)?;
    let descriptor = state.resolver().resolve(&video_id).await?;

    info!(video_id = %video_id, title = ?descriptor.title, "resolved stream");
    Ok(Json(StreamResponse::success(descriptor)))
}
