use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::warn;
use tubelink_core::ResolveError;

use crate::model::StreamResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Could not extract stream: {0}")]
    Resolve(#[from] ResolveError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        warn!(error = %message, "stream request failed");

        // Every resolution failure is reported the same way.
        let status = match self {
            AppError::Resolve(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(StreamResponse::error(message))).into_response()
    }
}
