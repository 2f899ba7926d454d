//! Extractor adapter for the tubelink stream resolver.
//!
//! An [`Extractor`] performs exactly one resolution attempt for a
//! [`VideoId`](tubelink_core::VideoId). The production implementation,
//! [`YtDlpExtractor`], runs the `yt-dlp` executable as a child process and
//! reads the single JSON document it prints.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tubelink_core::VideoId;
//! use tubelink_extractor::{Extractor, ExtractorConfig, ProxyPool, YtDlpExtractor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractorConfig::builder()
//!     .format("bestaudio/best")
//!     .socket_timeout(Duration::from_secs(15))
//!     .build();
//! let proxies = ProxyPool::new(
//!     vec!["socks5://127.0.0.1:9050".to_string()],
//!     Duration::from_secs(60),
//! );
//! let extractor = YtDlpExtractor::new(config).with_proxy_pool(proxies);
//!
//! let descriptor = extractor.extract(&VideoId::new("dQw4w9WgXcQ")?).await?;
//! println!("{}", descriptor.url);
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod extractor;
mod process;
pub mod proxy;
pub mod ytdlp;

pub use config::ExtractorConfig;
pub use extractor::Extractor;
pub use proxy::ProxyPool;
pub use ytdlp::YtDlpExtractor;
