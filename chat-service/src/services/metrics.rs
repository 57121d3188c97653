//! Prometheus metrics for chat-service.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::{Once, OnceLock};

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static CHAT_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static CHAT_GENERATION_DURATION_SECONDS: OnceLock<Histogram> = OnceLock::new();
pub static CHAT_MODEL_READY: OnceLock<IntGauge> = OnceLock::new();

static INIT: Once = Once::new();

/// Initialize all metrics. Later calls are no-ops.
pub fn init_metrics() {
    INIT.call_once(register_metrics);
}

fn register_metrics() {
    let registry = Registry::new();

    // outcome: greeting, generated, not_ready, failed
    let chat_requests = IntCounterVec::new(
        Opts::new("chat_requests_total", "Total chat generation requests"),
        &["outcome"],
    )
    .expect("Failed to create chat_requests_total metric");

    let generation_duration = Histogram::with_opts(
        HistogramOpts::new(
            "chat_generation_duration_seconds",
            "Model generation latency in seconds",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 10.0, 30.0, 60.0]),
    )
    .expect("Failed to create chat_generation_duration_seconds metric");

    let model_ready = IntGauge::new("chat_model_ready", "1 once the model is loaded")
        .expect("Failed to create chat_model_ready metric");

    registry
        .register(Box::new(chat_requests.clone()))
        .expect("Failed to register chat_requests_total");
    registry
        .register(Box::new(generation_duration.clone()))
        .expect("Failed to register chat_generation_duration_seconds");
    registry
        .register(Box::new(model_ready.clone()))
        .expect("Failed to register chat_model_ready");

    let _ = REGISTRY.set(registry);
    let _ = CHAT_REQUESTS_TOTAL.set(chat_requests);
    let _ = CHAT_GENERATION_DURATION_SECONDS.set(generation_duration);
    let _ = CHAT_MODEL_READY.set(model_ready);

    tracing::info!("Prometheus metrics initialized");
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
        format!("# Failed to convert metrics to UTF-8: {}\n", e)
    })
}

pub fn record_chat_request(outcome: &str) {
    if let Some(counter) = CHAT_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn record_generation_duration(duration_secs: f64) {
    if let Some(histogram) = CHAT_GENERATION_DURATION_SECONDS.get() {
        histogram.observe(duration_secs);
    }
}

pub fn set_model_ready(ready: bool) {
    if let Some(gauge) = CHAT_MODEL_READY.get() {
        gauge.set(i64::from(ready));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_requests_show_up_in_output() {
        init_metrics();
        init_metrics();
        record_chat_request("greeting");
        set_model_ready(true);

        let output = get_metrics();
        assert!(output.contains("chat_requests_total{outcome=\"greeting\"}"));
        assert!(output.contains("chat_model_ready 1"));
    }
}
