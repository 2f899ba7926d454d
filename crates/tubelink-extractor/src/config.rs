use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_BINARY: &str = "yt-dlp";
pub const DEFAULT_BASE_URL: &str = "https://youtu.be/";
pub const DEFAULT_FORMAT: &str = "bestaudio/best";
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_NETWORK_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Fixed settings applied to every extraction attempt.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ExtractorConfig {
    /// Program name or path of the `yt-dlp` executable.
    #[builder(default = DEFAULT_BINARY.to_string(), setter(into))]
    pub binary: String,

    /// Prefix the video id is appended to when building the media URL.
    #[builder(default = DEFAULT_BASE_URL.to_string(), setter(into))]
    pub base_url: String,

    /// yt-dlp format selector, e.g. `bestaudio/best`.
    #[builder(default = DEFAULT_FORMAT.to_string(), setter(into))]
    pub format: String,

    /// Network socket timeout handed to yt-dlp.
    #[builder(default = DEFAULT_SOCKET_TIMEOUT)]
    pub socket_timeout: Duration,

    /// Retries yt-dlp performs internally for HTTP errors.
    #[builder(default = DEFAULT_NETWORK_RETRIES)]
    pub network_retries: u32,

    /// Wall-clock limit for one attempt. The child is killed when it elapses.
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,

    #[builder(default, setter(strip_option, into))]
    pub user_agent: Option<String>,

    /// Extra request headers as `(name, value)` pairs.
    #[builder(default)]
    pub headers: Vec<(String, String)>,

    /// Site-specific hints, passed verbatim as `--extractor-args`.
    #[builder(default)]
    pub extractor_args: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
