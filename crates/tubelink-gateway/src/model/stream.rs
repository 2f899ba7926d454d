use serde::Serialize;
use tubelink_core::StreamDescriptor;

/// Body of `GET /stream/{video_id}`, tagged by `status`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StreamResponse {
    Success { data: StreamDescriptor },
    Error { message: String },
}

impl StreamResponse {
    pub fn success(data: StreamDescriptor) -> Self {
        Self::Success { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
