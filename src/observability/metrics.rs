//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): finished `/query` requests by outcome
//! - `gateway_rejections_total` (counter): rejections by kind
//! - `gateway_backend_latency_seconds` (histogram): backend call duration
//! - `gateway_origin_buckets` (gauge): tracked origin rate-limit buckets
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exposition is optional and served on its own listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a successfully completed request.
pub fn record_admitted(start_time: Instant) {
    counter!("gateway_requests_total", "outcome" => "admitted").increment(1);
    histogram!("gateway_request_duration_seconds").record(start_time.elapsed().as_secs_f64());
}

/// Record a rejected request.
pub fn record_rejected(kind: &'static str) {
    counter!("gateway_requests_total", "outcome" => "rejected").increment(1);
    counter!("gateway_rejections_total", "kind" => kind).increment(1);
}

/// Record one backend call.
pub fn record_backend_call(backend: &'static str, start_time: Instant, ok: bool) {
    histogram!(
        "gateway_backend_latency_seconds",
        "backend" => backend,
        "ok" => if ok { "true" } else { "false" }
    )
    .record(start_time.elapsed().as_secs_f64());
}

/// Record the number of tracked origin buckets.
pub fn record_origin_buckets(count: usize) {
    gauge!("gateway_origin_buckets").set(count as f64);
}
