use std::time::Duration;
use thiserror::Error;

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Why a single extraction attempt produced no descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    #[error("failed to launch extractor: {0}")]
    Launch(String),
    #[error("extractor timed out after {0:?}")]
    Timeout(Duration),
    #[error("extractor exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("extractor output is invalid: {0}")]
    InvalidOutput(String),
    #[error("no stream URL found")]
    NoStreamUrl,
}

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// A single attempt failed. Consumed by the retry loop.
    #[error("resolution failed: {0}")]
    ResolutionFailed(#[source] FailureCause),
    /// Every attempt failed; carries the cause of the last one.
    #[error("resolution exhausted after {attempts} attempts: {cause}")]
    ResolutionExhausted {
        attempts: u32,
        #[source]
        cause: FailureCause,
    },
    #[error("invalid video id: {0}")]
    InvalidVideoId(String),
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

impl From<FailureCause> for ResolveError {
    fn from(cause: FailureCause) -> Self {
        ResolveError::ResolutionFailed(cause)
    }
}

impl ResolveError {
    /// Returns the underlying extraction cause, if this error carries one.
    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            ResolveError::ResolutionFailed(cause) => Some(cause),
            ResolveError::ResolutionExhausted { cause, .. } => Some(cause),
            ResolveError::InvalidVideoId(_) | ResolveError::Cache(_) => None,
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Extraction failures are not classified any further, so every one of
    /// them counts as retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolveError::ResolutionFailed(_))
    }
}
