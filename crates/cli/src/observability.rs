//! Tracing subscriber and OpenTelemetry exporter wiring.

use anyhow::{Context, Result};
use opentelemetry::trace::{TraceResult, TracerProvider as _};
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogFormat;

const SERVICE_NAME: &str = "release-trigger";

/// Handle on the installed exporter, if any.
///
/// The Lambda sandbox may be frozen between invocations, so buffered spans
/// are flushed after each event rather than only at exit.
#[derive(Clone, Default)]
pub struct Telemetry {
    provider: Option<TracerProvider>,
}

impl Telemetry {
    /// Exports buffered spans now; failures are logged and otherwise ignored.
    pub fn flush(&self) {
        if let Some(provider) = &self.provider {
            warn_on_failure("flush", provider.force_flush());
        }
    }

    pub fn shutdown(&self) {
        if let Some(provider) = &self.provider {
            warn_on_failure("shutdown", [provider.shutdown()]);
        }
    }
}

/// Logs each failed exporter operation and returns how many failed.
fn warn_on_failure(action: &str, results: impl IntoIterator<Item = TraceResult<()>>) -> usize {
    let mut failures = 0;
    for err in results.into_iter().filter_map(Result::err) {
        tracing::warn!(error = %err, "telemetry {action} failed");
        failures += 1;
    }
    failures
}

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`
/// filter.
pub fn init(format: LogFormat, otlp_endpoint: Option<&str>) -> Result<Telemetry> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let provider = otlp_endpoint.map(build_provider).transpose()?;
    if let Some(provider) = &provider {
        opentelemetry::global::set_tracer_provider(provider.clone());
    }
    let otel_layer = provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME)));

    let json_layer = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
    });
    let text_layer = (format == LogFormat::Text).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(otel_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(Telemetry { provider })
}

fn build_provider(endpoint: &str) -> Result<TracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("failed to build OTLP span exporter")?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(Resource::new([KeyValue::new("service.name", SERVICE_NAME)]))
        .build())
}
