//! OpenTelemetry tracer provider setup.

use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};

use crate::config::observability::ObservabilityConfig;

use super::ObservabilityError;

pub(super) fn build_tracer_provider(
    config: &ObservabilityConfig,
) -> Result<SdkTracerProvider, ObservabilityError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otel_exporter_otlp_endpoint.clone())
        .with_timeout(Duration::from_secs(config.otel_exporter_otlp_timeout_seconds))
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_sampler(sampler(config.otel_trace_sample_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource(config))
        .with_batch_exporter(exporter)
        .build())
}

fn resource(config: &ObservabilityConfig) -> Resource {
    Resource::builder_empty()
        .with_service_name(config.otel_service_name.clone())
        .with_attributes([
            KeyValue::new("service.namespace", "storefront"),
            KeyValue::new("service.version", config.otel_service_version.clone()),
            KeyValue::new(
                "deployment.environment.name",
                config.otel_deployment_environment.clone(),
            ),
        ])
        .build()
}

/// Respect the caller's sampling decision; sample new roots at `ratio`.
fn sampler(ratio: f64) -> Sampler {
    Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(clamp_ratio(ratio))))
}

/// Bound a configured ratio to `[0.0, 1.0]`; an unparseable NaN samples
/// everything.
fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() { 1.0 } else { ratio.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;
    use testresult::TestResult;

    use crate::config::ServerConfig;

    use super::*;

    #[test]
    fn resource_names_the_service() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "storefront-json",
            "--database-url",
            "postgres://localhost/storefront",
            "--otel-deployment-environment",
            "staging",
        ])?;

        let resource = resource(&config.observability);

        let attribute = |name: &str| {
            resource
                .iter()
                .find(|(key, _)| key.as_str() == name)
                .map(|(_, value)| value.to_string())
        };

        assert_eq!(attribute("service.name").as_deref(), Some("storefront-json"));
        assert_eq!(attribute("service.namespace").as_deref(), Some("storefront"));
        assert_eq!(
            attribute("deployment.environment.name").as_deref(),
            Some("staging")
        );

        Ok(())
    }

    #[test]
    fn out_of_range_ratios_are_clamped() {
        let clamped: Vec<f64> = [-0.5, 0.0, 0.25, 1.0, 3.0, f64::NAN]
            .into_iter()
            .map(clamp_ratio)
            .collect();

        assert_eq!(clamped, vec![0.0, 0.0, 0.25, 1.0, 1.0, 1.0]);
    }
}
