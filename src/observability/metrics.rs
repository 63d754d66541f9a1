//! Metrics collection and exposition.
//!
//! # Metrics
//! - `replykit_responses_total` (counter): flushed responses by status code
//! - `replykit_flush_failures_total` (counter): responses whose body write failed

use std::net::SocketAddr;

use http::StatusCode;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_response(status: StatusCode) {
    metrics::counter!("replykit_responses_total", "status" => status.as_str().to_owned()).increment(1);
}

pub fn record_flush_failure() {
    metrics::counter!("replykit_flush_failures_total").increment(1);
}
