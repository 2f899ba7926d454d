//! Cached, retrying stream resolution.
//!
//! This crate provides [`CachedResolver`], which answers repeated lookups
//! for the same video from a bounded cache and retries failed extractions
//! with exponential backoff before giving up.
//!
//! # Example
//!
//! ```rust,no_run
//! use tubelink_cache::MokaDescriptorCache;
//! use tubelink_core::VideoId;
//! use tubelink_extractor::{ExtractorConfig, YtDlpExtractor};
//! use tubelink_resolver::{CachedResolver, RetryPolicy};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = YtDlpExtractor::new(ExtractorConfig::default());
//! let cache = MokaDescriptorCache::with_capacity(128);
//! let resolver = CachedResolver::new(extractor, cache, RetryPolicy::default());
//!
//! let descriptor = resolver.resolve(&VideoId::new("dQw4w9WgXcQ")?).await?;
//! println!("{} ({:?}s)", descriptor.url, descriptor.duration);
//! # Ok(())
//! # }
//! ```

pub mod resolver;
pub mod retry;
pub mod service;

pub use resolver::Resolver;
pub use retry::RetryPolicy;
pub use service::CachedResolver;
