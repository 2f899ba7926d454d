//! Descriptor cache trait and the in-memory implementation used by the
//! resolver.

pub mod cache;
pub mod moka;

pub use cache::DescriptorCache;
pub use moka::{CacheConfig, MokaDescriptorCache};
pub use tubelink_core::CacheError;
