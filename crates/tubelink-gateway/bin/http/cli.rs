use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;
use tubelink_cache::MokaDescriptorCache;
use tubelink_extractor::{ExtractorConfig, ProxyPool};
use tubelink_resolver::RetryPolicy;
use tubelink_telemetry::LogFormat;

pub const LISTEN_ADDR_ENV: &str = "TUBELINK_GATEWAY_LISTEN_ADDR";
pub const YTDLP_BINARY_ENV: &str = "TUBELINK_GATEWAY_YTDLP_BINARY";
pub const FORMAT_ENV: &str = "TUBELINK_GATEWAY_FORMAT";
pub const SOCKET_TIMEOUT_SECS_ENV: &str = "TUBELINK_GATEWAY_SOCKET_TIMEOUT_SECS";
pub const EXTRACT_TIMEOUT_SECS_ENV: &str = "TUBELINK_GATEWAY_EXTRACT_TIMEOUT_SECS";
pub const NETWORK_RETRIES_ENV: &str = "TUBELINK_GATEWAY_NETWORK_RETRIES";
pub const USER_AGENT_ENV: &str = "TUBELINK_GATEWAY_USER_AGENT";
pub const ACCEPT_LANGUAGE_ENV: &str = "TUBELINK_GATEWAY_ACCEPT_LANGUAGE";
pub const HEADERS_ENV: &str = "TUBELINK_GATEWAY_HEADERS";
pub const EXTRACTOR_ARGS_ENV: &str = "TUBELINK_GATEWAY_EXTRACTOR_ARGS";
pub const PROXIES_ENV: &str = "TUBELINK_GATEWAY_PROXIES";
pub const PROXY_COOLDOWN_SECS_ENV: &str = "TUBELINK_GATEWAY_PROXY_COOLDOWN_SECS";
pub const MAX_ATTEMPTS_ENV: &str = "TUBELINK_GATEWAY_MAX_ATTEMPTS";
pub const BACKOFF_BASE_MS_ENV: &str = "TUBELINK_GATEWAY_BACKOFF_BASE_MS";
pub const CACHE_CAPACITY_ENV: &str = "TUBELINK_GATEWAY_CACHE_CAPACITY";
pub const CACHE_TTL_SECS_ENV: &str = "TUBELINK_GATEWAY_CACHE_TTL_SECS";
pub const LOG_FORMAT_ENV: &str = "TUBELINK_GATEWAY_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "TUBELINK_GATEWAY_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_YTDLP_BINARY: &str = "yt-dlp";
pub const DEFAULT_FORMAT: &str = "bestaudio/best";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "pretty")]
    Pretty,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Pretty => write!(f, "pretty"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "tubelink-gateway-http-server")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(long, env = YTDLP_BINARY_ENV, default_value = DEFAULT_YTDLP_BINARY)]
    pub ytdlp_binary: String,

    #[arg(long, env = FORMAT_ENV, default_value = DEFAULT_FORMAT)]
    pub format: String,

    #[arg(long, env = SOCKET_TIMEOUT_SECS_ENV, default_value_t = 15)]
    pub socket_timeout_secs: u64,

    #[arg(long, env = EXTRACT_TIMEOUT_SECS_ENV, default_value_t = 60)]
    pub extract_timeout_secs: u64,

    #[arg(long, env = NETWORK_RETRIES_ENV, default_value_t = 3)]
    pub network_retries: u32,

    #[arg(long, env = USER_AGENT_ENV)]
    pub user_agent: Option<String>,

    #[arg(long, env = ACCEPT_LANGUAGE_ENV)]
    pub accept_language: Option<String>,

    /// Extra request header as `NAME:VALUE`. Repeatable.
    #[arg(
        long = "header",
        env = HEADERS_ENV,
        value_delimiter = ',',
        value_parser = parse_header,
    )]
    pub headers: Vec<(String, String)>,

    /// Passed verbatim to yt-dlp as `--extractor-args`. Repeatable.
    #[arg(long, env = EXTRACTOR_ARGS_ENV)]
    pub extractor_args: Vec<String>,

    /// Outbound proxy URL. Repeatable; attempts rotate through the list.
    #[arg(long = "proxy", env = PROXIES_ENV, value_delimiter = ',')]
    pub proxies: Vec<String>,

    #[arg(long, env = PROXY_COOLDOWN_SECS_ENV, default_value_t = 60)]
    pub proxy_cooldown_secs: u64,

    #[arg(long, env = MAX_ATTEMPTS_ENV, default_value_t = 3)]
    pub max_attempts: u32,

    #[arg(long, env = BACKOFF_BASE_MS_ENV, default_value_t = 1000)]
    pub backoff_base_ms: u64,

    #[arg(long, env = CACHE_CAPACITY_ENV, default_value_t = 128)]
    pub cache_capacity: u64,

    /// Expire cached streams after this many seconds. Unset keeps them until evicted.
    #[arg(long, env = CACHE_TTL_SECS_ENV)]
    pub cache_ttl_secs: Option<u64>,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Pretty
    )]
    pub log_format: LogFormatArg,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl CLI {
    pub fn extractor_config(&self) -> ExtractorConfig {
        let mut headers = self.headers.clone();
        if let Some(language) = &self.accept_language {
            headers.push(("Accept-Language".to_string(), language.clone()));
        }

        let config = ExtractorConfig::builder()
            .binary(self.ytdlp_binary.clone())
            .format(self.format.clone())
            .socket_timeout(Duration::from_secs(self.socket_timeout_secs))
            .timeout(Duration::from_secs(self.extract_timeout_secs))
            .network_retries(self.network_retries)
            .headers(headers)
            .extractor_args(self.extractor_args.clone());

        match &self.user_agent {
            Some(user_agent) => config.user_agent(user_agent.clone()).build(),
            None => config.build(),
        }
    }

    pub fn proxy_pool(&self) -> ProxyPool {
        ProxyPool::new(
            self.proxies.clone(),
            Duration::from_secs(self.proxy_cooldown_secs),
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_attempts(self.max_attempts)
            .base_delay(Duration::from_millis(self.backoff_base_ms))
            .build()
    }

    pub fn cache(&self) -> MokaDescriptorCache {
        match self.cache_ttl_secs {
            Some(ttl) => {
                MokaDescriptorCache::with_ttl(self.cache_capacity, Duration::from_secs(ttl))
            }
            None => MokaDescriptorCache::with_capacity(self.cache_capacity),
        }
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in `{raw}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
