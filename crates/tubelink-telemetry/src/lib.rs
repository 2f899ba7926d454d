//! Process-wide tracing setup for tubelink binaries.
//!
//! Installs a `tracing` subscriber made of an env filter, a human-readable or
//! JSON formatter and, when an OTLP endpoint is configured, an OpenTelemetry
//! span exporter. Records emitted through the `log` crate are bridged in.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};
use typed_builder::TypedBuilder;

pub type Result<T> = std::result::Result<T, TelemetryError>;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("failed to build span exporter: {0}")]
    Exporter(String),
    #[error("a global subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct TelemetryConfig {
    /// Reported as `service.name` on exported spans.
    #[builder(setter(into))]
    pub service_name: String,
    #[builder(default)]
    pub log_format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    #[builder(default = "info".to_string(), setter(into))]
    pub default_filter: String,
    /// OTLP/gRPC collector endpoint, e.g. `http://localhost:4317`.
    #[builder(default, setter(strip_option, into))]
    pub otlp_endpoint: Option<String>,
}

/// Flushes exported spans when dropped. Keep it alive for the whole process.
#[must_use]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                warn!(error = %e, "failed to shut down tracer provider");
            }
        }
    }
}

/// Installs the global subscriber described by `config`.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::try_new(directives),
        Err(_) => EnvFilter::try_new(&config.default_filter),
    }
    .map_err(|e| TelemetryError::Filter(e.to_string()))?;

    let fmt_layer = match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    let provider = match &config.otlp_endpoint {
        Some(endpoint) => Some(tracer_provider(&config.service_name, endpoint)?),
        None => None,
    };
    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    let subscriber = Registry::default()
        .with(fmt_layer)
        .with(otel_layer)
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    tracing_log::LogTracer::init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    if let Some(provider) = &provider {
        opentelemetry::global::set_tracer_provider(provider.clone());
    }

    Ok(TelemetryGuard { provider })
}

fn tracer_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        .build())
}
