use crate::error::ResolveError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A validated identifier for a piece of media on the upstream platform.
///
/// Ids must be 1-64 characters long and contain only alphanumeric
/// characters, hyphens, or underscores. This keeps the canonical media URL
/// well formed and stops an id from being read as a command-line flag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

const MAX_LENGTH: usize = 64;

impl VideoId {
    /// Creates a new `VideoId` after validating the input.
    pub fn new(id: impl Into<String>) -> std::result::Result<Self, ResolveError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Creates a `VideoId` without validation.
    ///
    /// Use this only for ids coming from trusted internal sources.
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the canonical media URL for this id under `base_url`.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> std::result::Result<(), ResolveError> {
        if id.is_empty() || id.len() > MAX_LENGTH {
            return Err(ResolveError::InvalidVideoId(format!(
                "length must be between 1 and {}, got {}",
                MAX_LENGTH,
                id.len()
            )));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ResolveError::InvalidVideoId(format!(
                "must contain only alphanumeric characters, hyphens, or underscores: '{}'",
                id
            )));
        }

        Ok(())
    }
}

impl TryFrom<String> for VideoId {
    type Error = ResolveError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

impl Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
