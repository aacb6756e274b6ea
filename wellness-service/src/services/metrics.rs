//! Prometheus metrics for wellness-service.
//!
//! Recording helpers are no-ops until [`init_metrics`] has run, so handlers
//! can be exercised in tests without a registry.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// All collectors, registered against one registry.
pub struct Metrics {
    pub registry: Registry,
    pub proxy_requests_total: IntCounterVec,
    pub provider_latency_seconds: HistogramVec,
    pub provider_errors_total: IntCounterVec,
    pub fallbacks_total: IntCounterVec,
}

pub static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Initialize all metrics. Safe to call more than once; later calls are ignored.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let proxy_requests = IntCounterVec::new(
        Opts::new(
            "wellness_proxy_requests_total",
            "Total proxy requests by endpoint and outcome",
        ),
        &["endpoint", "outcome"], // outcome: success, fallback
    )?;

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "wellness_provider_latency_seconds",
            "Text provider call latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        &["provider", "model"],
    )?;

    let provider_errors = IntCounterVec::new(
        Opts::new(
            "wellness_provider_errors_total",
            "Total text provider errors",
        ),
        &["endpoint", "error_type"],
    )?;

    let fallbacks = IntCounterVec::new(
        Opts::new(
            "wellness_fallbacks_total",
            "Fallback responses served, by failure class",
        ),
        &["endpoint", "kind"],
    )?;

    registry.register(Box::new(proxy_requests.clone()))?;
    registry.register(Box::new(provider_latency.clone()))?;
    registry.register(Box::new(provider_errors.clone()))?;
    registry.register(Box::new(fallbacks.clone()))?;

    // A concurrent initializer may win; its collectors are equivalent
    let _ = METRICS.set(Metrics {
        registry,
        proxy_requests_total: proxy_requests,
        provider_latency_seconds: provider_latency,
        provider_errors_total: provider_errors,
        fallbacks_total: fallbacks,
    });

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match METRICS.get() {
        Some(m) => &m.registry,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

/// Record a completed proxy request.
pub fn record_proxy_request(endpoint: &str, outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.proxy_requests_total
            .with_label_values(&[endpoint, outcome])
            .inc();
    }
}

/// Record provider latency.
pub fn record_provider_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(m) = METRICS.get() {
        m.provider_latency_seconds
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record a provider error.
pub fn record_provider_error(endpoint: &str, error_type: &str) {
    if let Some(m) = METRICS.get() {
        m.provider_errors_total
            .with_label_values(&[endpoint, error_type])
            .inc();
    }
}

/// Record a fallback response.
pub fn record_fallback(endpoint: &str, kind: &str) {
    if let Some(m) = METRICS.get() {
        m.fallbacks_total
            .with_label_values(&[endpoint, kind])
            .inc();
    }
}
