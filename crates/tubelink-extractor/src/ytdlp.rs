use crate::config::ExtractorConfig;
use crate::extractor::Extractor;
use crate::process::{run_with_timeout, stderr_summary};
use crate::proxy::ProxyPool;
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Output;
use tracing::{debug, trace};
use tubelink_core::{FailureCause, ResolveError, Result, StreamDescriptor, VideoId};

/// The subset of yt-dlp's `--dump-single-json` document we read.
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    url: Option<String>,
    duration: Option<f64>,
    title: Option<String>,
}

/// Resolves streams by running the `yt-dlp` executable.
///
/// Each call spawns one child process. When a [`ProxyPool`] is attached, a
/// proxy is picked per attempt and its health is updated from the outcome.
#[derive(Debug)]
pub struct YtDlpExtractor {
    config: ExtractorConfig,
    proxies: ProxyPool,
}

impl YtDlpExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            proxies: ProxyPool::empty(),
        }
    }

    pub fn with_proxy_pool(mut self, proxies: ProxyPool) -> Self {
        self.proxies = proxies;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Builds the yt-dlp command line for one attempt.
    fn build_args(&self, media_url: &str, proxy: Option<&str>) -> Vec<String> {
        let config = &self.config;
        let mut args: Vec<String> = [
            "--dump-single-json",
            "--skip-download",
            "--no-playlist",
            "--no-progress",
            "--quiet",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        args.push("--format".to_string());
        args.push(config.format.clone());
        args.push("--socket-timeout".to_string());
        args.push(config.socket_timeout.as_secs().max(1).to_string());
        args.push("--retries".to_string());
        args.push(config.network_retries.to_string());

        if let Some(user_agent) = &config.user_agent {
            args.push("--user-agent".to_string());
            args.push(user_agent.clone());
        }

        for (name, value) in &config.headers {
            args.push("--add-header".to_string());
            args.push(format!("{}:{}", name, value));
        }

        for hint in &config.extractor_args {
            args.push("--extractor-args".to_string());
            args.push(hint.clone());
        }

        if let Some(proxy) = proxy {
            args.push("--proxy".to_string());
            args.push(proxy.to_string());
        }

        args.push("--".to_string());
        args.push(media_url.to_string());
        args
    }

    async fn run(&self, args: &[String]) -> std::result::Result<StreamDescriptor, FailureCause> {
        let output = run_with_timeout(&self.config.binary, args, self.config.timeout).await?;
        interpret_output(output)
    }
}

/// Turns a finished yt-dlp process into a descriptor or a failure cause.
fn interpret_output(output: Output) -> std::result::Result<StreamDescriptor, FailureCause> {
    if !output.status.success() {
        return Err(FailureCause::Exit {
            status: output.status.to_string(),
            stderr: stderr_summary(&output.stderr),
        });
    }
    parse_info(&output.stdout)
}

fn parse_info(stdout: &[u8]) -> std::result::Result<StreamDescriptor, FailureCause> {
    let info: YtDlpInfo = serde_json::from_slice(stdout)
        .map_err(|e| FailureCause::InvalidOutput(e.to_string()))?;

    let url = info
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or(FailureCause::NoStreamUrl)?;

    Ok(StreamDescriptor {
        url,
        duration: info.duration,
        title: info.title,
    })
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    async fn extract(&self, video_id: &VideoId) -> Result<StreamDescriptor> {
        let media_url = video_id.to_url(&self.config.base_url);
        let proxy = self.proxies.next().map(str::to_owned);
        let args = self.build_args(&media_url, proxy.as_deref());

        debug!(
            video_id = %video_id,
            proxied = proxy.is_some(),
            "running yt-dlp"
        );
        trace!(binary = %self.config.binary, args = ?args, "yt-dlp command line");

        let outcome = self.run(&args).await;

        if let Some(proxy) = &proxy {
            match &outcome {
                Ok(_) => self.proxies.report_success(proxy),
                Err(_) => self.proxies.report_failure(proxy),
            }
        }

        outcome.map_err(ResolveError::ResolutionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn extractor() -> YtDlpExtractor {
        YtDlpExtractor::new(ExtractorConfig::default())
    }

    async fn sh(script: &str) -> Output {
        run_with_timeout(
            "sh",
            &["-c".to_string(), script.to_string()],
            Duration::from_secs(5),
        )
        .await
        .unwrap()
    }

    #[test]
    fn default_args_request_single_json_for_best_audio() {
        let args = extractor().build_args("https://youtu.be/abc123", None);

        assert_eq!(args[0], "--dump-single-json");
        assert!(args.contains(&"--skip-download".to_string()));
        let format = args.iter().position(|a| a == "--format").unwrap();
        assert_eq!(args[format + 1], "bestaudio/best");
        let timeout = args.iter().position(|a| a == "--socket-timeout").unwrap();
        assert_eq!(args[timeout + 1], "15");
        assert!(!args.contains(&"--proxy".to_string()));
        assert_eq!(&args[args.len() - 2..], ["--", "https://youtu.be/abc123"]);
    }

    #[test]
    fn args_carry_overrides_and_proxy() {
        let config = ExtractorConfig::builder()
            .user_agent("Mozilla/5.0")
            .headers(vec![("Accept-Language".to_string(), "en-US".to_string())])
            .extractor_args(vec!["youtube:player_client=android".to_string()])
            .build();
        let args = YtDlpExtractor::new(config)
            .build_args("https://youtu.be/x", Some("socks5://p:1080"));

        let joined = args.join(" ");
        assert!(joined.contains("--user-agent Mozilla/5.0"));
        assert!(joined.contains("--add-header Accept-Language:en-US"));
        assert!(joined.contains("--extractor-args youtube:player_client=android"));
        assert!(joined.contains("--proxy socks5://p:1080"));
        assert!(joined.ends_with("-- https://youtu.be/x"));
    }

    #[test]
    fn parses_descriptor_from_json() {
        let json = br#"{"id":"abc123","url":"https://cdn.example/abc123.m4a","duration":212,"title":"Song","ext":"m4a"}"#;
        let descriptor = parse_info(json).unwrap();

        assert_eq!(descriptor.url, "https://cdn.example/abc123.m4a");
        assert_eq!(descriptor.duration, Some(212.0));
        assert_eq!(descriptor.title.as_deref(), Some("Song"));
    }

    #[test]
    fn optional_metadata_may_be_missing() {
        let descriptor = parse_info(br#"{"url":"https://cdn.example/x"}"#).unwrap();
        assert!(descriptor.duration.is_none());
        assert!(descriptor.title.is_none());
    }

    #[test]
    fn missing_or_empty_url_is_rejected() {
        assert_eq!(
            parse_info(br#"{"title":"Song"}"#).unwrap_err(),
            FailureCause::NoStreamUrl
        );
        assert_eq!(
            parse_info(br#"{"url":"  "}"#).unwrap_err(),
            FailureCause::NoStreamUrl
        );
    }

    #[test]
    fn garbage_output_is_invalid() {
        assert!(matches!(
            parse_info(b"not json"),
            Err(FailureCause::InvalidOutput(_))
        ));
    }

    #[tokio::test]
    async fn non_zero_exit_reports_last_stderr_line() {
        let output =
            sh("echo 'WARNING: slow' >&2; echo 'ERROR: Video unavailable' >&2; exit 1").await;

        match interpret_output(output).unwrap_err() {
            FailureCause::Exit { stderr, .. } => assert_eq!(stderr, "ERROR: Video unavailable"),
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[tokio::test]
    async fn successful_exit_is_parsed() {
        let output = sh(r#"printf '{"url":"https://cdn.example/y","title":"T"}'"#).await;
        let descriptor = interpret_output(output).unwrap();
        assert_eq!(descriptor.url, "https://cdn.example/y");
    }

    #[tokio::test]
    async fn failing_binary_is_resolution_failed() {
        let config = ExtractorConfig::builder().binary("false").build();
        let err = YtDlpExtractor::new(config)
            .extract(&VideoId::new("abc123").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::ResolutionFailed(FailureCause::Exit { .. })
        ));
    }

    #[tokio::test]
    async fn silent_binary_is_invalid_output() {
        let config = ExtractorConfig::builder().binary("true").build();
        let err = YtDlpExtractor::new(config)
            .extract(&VideoId::new("abc123").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::ResolutionFailed(FailureCause::InvalidOutput(_))
        ));
    }

    #[tokio::test]
    async fn failed_attempt_quarantines_its_proxy() {
        let config = ExtractorConfig::builder().binary("false").build();
        let proxies = ProxyPool::new(
            vec!["http://p1".to_string(), "http://p2".to_string()],
            Duration::from_secs(60),
        );
        let extractor = YtDlpExtractor::new(config).with_proxy_pool(proxies);

        extractor
            .extract(&VideoId::new("abc123").unwrap())
            .await
            .unwrap_err();

        // p1 served the failed attempt, so only p2 is handed out now.
        assert_eq!(extractor.proxies.next(), Some("http://p2"));
        assert_eq!(extractor.proxies.next(), Some("http://p2"));
    }
}
