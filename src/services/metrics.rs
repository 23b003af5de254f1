//! Prometheus metrics for the HTTP service.

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Request and prediction metrics.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Requests by handler, method and status
    pub http_requests_total: CounterVec,
    /// Request latency in seconds by handler and method
    pub http_request_duration_seconds: HistogramVec,
    /// Successful predictions by class
    pub predictions_total: CounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["handler", "method", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .buckets(vec![
                0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ]),
            &["handler", "method"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        let predictions_total = CounterVec::new(
            Opts::new("predictions_total", "Total predictions served by class"),
            &["class"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            http_requests_total,
            http_request_duration_seconds,
            predictions_total,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn observe_request(&self, handler: &str, method: &str, status: u16, seconds: f64) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[handler, method, status.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[handler, method])
            .observe(seconds);
    }

    pub fn inc_prediction(&self, class: u8) {
        let class = class.to_string();
        self.predictions_total
            .with_label_values(&[class.as_str()])
            .inc();
    }
}
