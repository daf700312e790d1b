//! Metrics collection and exposition.
//!
//! # Metrics
//! All counters carry a `path` label holding the resource path.
//! - `resources_served`: asset served directly
//! - `fallbacks`: entry document served in place of the requested path
//! - `brotli_served` / `gzip_served`: a precompressed variant was sent
//! - `not_found`: 404 answered
//! - `errors`: 500 answered

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// One observable event in the life of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Served,
    Fallback,
    BrotliServed,
    GzipServed,
    NotFound,
    Error,
}

impl Signal {
    pub fn counter_name(self) -> &'static str {
        match self {
            Signal::Served => "resources_served",
            Signal::Fallback => "fallbacks",
            Signal::BrotliServed => "brotli_served",
            Signal::GzipServed => "gzip_served",
            Signal::NotFound => "not_found",
            Signal::Error => "errors",
        }
    }
}

/// Destination for request signals.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, signal: Signal, path: &str);
}

/// Forwards signals to the global `metrics` recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSink;

impl TelemetrySink for MetricsSink {
    fn record(&self, signal: Signal, path: &str) {
        metrics::counter!(signal.counter_name(), "path" => path.to_string()).increment(1);
    }
}

/// Drops every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn record(&self, _signal: Signal, _path: &str) {}
}

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus recorder"),
    }
}
