//! Core types for the tubelink stream resolver.
//!
//! This crate provides the types shared by the extractor, the cached
//! resolver and the HTTP gateway.

pub mod descriptor;
pub mod error;
pub mod video_id;

pub use descriptor::StreamDescriptor;
pub use error::{CacheError, FailureCause, ResolveError, Result};
pub use video_id::VideoId;
