mod cli;

use crate::cli::CLI;
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tubelink_extractor::YtDlpExtractor;
use tubelink_gateway::{App, AppState};
use tubelink_resolver::CachedResolver;
use tubelink_telemetry::TelemetryConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    let telemetry = TelemetryConfig::builder()
        .service_name("tubelink-gateway")
        .log_format(config.log_format.into())
        .build();
    let telemetry = match &config.otlp_endpoint {
        Some(endpoint) => TelemetryConfig {
            otlp_endpoint: Some(endpoint.clone()),
            ..telemetry
        },
        None => telemetry,
    };
    let _guard = tubelink_telemetry::init(&telemetry).context("failed to initialize telemetry")?;

    let extractor =
        YtDlpExtractor::new(config.extractor_config()).with_proxy_pool(config.proxy_pool());
    let resolver = CachedResolver::new(extractor, config.cache(), config.retry_policy());
    let app = App::router(AppState::new(Arc::new(resolver)));

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    info!(
        listen_addr = %listener.local_addr()?,
        ytdlp_binary = %config.ytdlp_binary,
        proxies = config.proxies.len(),
        max_attempts = config.max_attempts,
        cache_capacity = config.cache_capacity,
        log_format = %config.log_format,
        "starting gateway server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
