//! Push-export telemetry pipeline: traces and logs over OTLP/gRPC to a
//! collector, plus a local fmt layer so the process still logs to stdout.
//!
//! The pipeline is installed once per process. Sampling, batching, and retry
//! stay at exporter defaults; the only knobs are the collector endpoint and
//! the local log filter/format.

use once_cell::sync::OnceCell;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    logs::LoggerProvider, propagation::TraceContextPropagator, runtime, trace as sdktrace,
    Resource,
};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use lumen_kernel::settings::{LogFormat, TelemetrySettings};

static SUBSCRIBER_INSTALLED: OnceCell<()> = OnceCell::new();

/// Guard keeping the exporters alive; dropping it flushes and shuts the
/// providers down.
pub struct TelemetryGuard {
    logger_provider: LoggerProvider,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        let _ = self.logger_provider.shutdown();
        global::shutdown_tracer_provider();
    }
}

/// Wire up the trace and log exporters once per process, tagged with
/// `service.name = {service_name}`.
///
/// Must run inside a Tokio runtime; batch export rides on it. A malformed
/// collector endpoint is rejected here, before any exporter is installed.
pub fn init(
    service_name: &'static str,
    settings: &TelemetrySettings,
) -> Result<TelemetryGuard, TelemetryError> {
    validate_endpoint(&settings.otlp_endpoint)?;

    let env_filter = EnvFilter::try_new(&settings.log_filter)
        .map_err(|err| TelemetryError::InvalidLogFilter(err.to_string()))?;

    let resource = Resource::new(vec![KeyValue::new("service.name", service_name)]);

    let tracer_provider = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(settings.otlp_endpoint.clone()),
        )
        .with_trace_config(sdktrace::Config::default().with_resource(resource.clone()))
        .install_batch(runtime::Tokio)
        .map_err(|err| TelemetryError::Tracing(err.to_string()))?;

    global::set_tracer_provider(tracer_provider.clone());
    global::set_text_map_propagator(TraceContextPropagator::new());
    let tracer = tracer_provider.tracer(service_name);

    let log_exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(settings.otlp_endpoint.clone())
        .build_log_exporter()
        .map_err(|err| TelemetryError::Logging(err.to_string()))?;

    let logger_provider = LoggerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(log_exporter, runtime::Tokio)
        .build();

    let fmt_layer = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(true).boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    if SUBSCRIBER_INSTALLED.set(()).is_ok() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .with(OpenTelemetryTracingBridge::new(&logger_provider))
            .try_init()
            .map_err(|err| TelemetryError::Subscriber(err.to_string()))?;
    }

    Ok(TelemetryGuard { logger_provider })
}

/// Reject endpoints the exporter could not construct a channel from, so a
/// bad override aborts startup instead of surfacing on first export.
fn validate_endpoint(endpoint: &str) -> Result<(), TelemetryError> {
    let url = url::Url::parse(endpoint)
        .map_err(|err| TelemetryError::InvalidEndpoint(endpoint.to_string(), err.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(TelemetryError::InvalidEndpoint(
            endpoint.to_string(),
            "expected an absolute http(s) URL".to_string(),
        ));
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid collector endpoint `{0}`: {1}")]
    InvalidEndpoint(String, String),
    #[error("invalid log filter: {0}")]
    InvalidLogFilter(String),
    #[error("failed to install trace exporter: {0}")]
    Tracing(String),
    #[error("failed to install log exporter: {0}")]
    Logging(String),
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_passes_validation() {
        let settings = TelemetrySettings::default();
        assert!(validate_endpoint(&settings.otlp_endpoint).is_ok());
    }

    #[test]
    fn https_endpoint_passes_validation() {
        assert!(validate_endpoint("https://collector.internal:4317").is_ok());
    }

    #[test]
    fn malformed_endpoint_is_rejected() {
        let err = validate_endpoint("otel-collector:4317").unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidEndpoint(..)));

        let err = validate_endpoint("not a url at all").unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidEndpoint(..)));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err = validate_endpoint("ftp://collector:4317").unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidEndpoint(..)));
    }

    #[test]
    fn bad_log_filter_fails_before_install() {
        let settings = TelemetrySettings {
            log_filter: "not==valid==filter".to_string(),
            ..TelemetrySettings::default()
        };
        // Endpoint validation passes, the filter does not; init must fail
        // without touching the exporters.
        assert!(validate_endpoint(&settings.otlp_endpoint).is_ok());
        let err = EnvFilter::try_new(&settings.log_filter);
        assert!(err.is_err());
    }
}
