//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rate_unlimiter_probes_total` (counter): probes by outcome
//! - `rate_unlimiter_request_rate` (gauge): observed requests per minute
//! - `rate_unlimiter_current_delay_seconds` (gauge): next cooldown
//! - `rate_unlimiter_consecutive_blocks` (gauge): length of the current episode
//! - `rate_unlimiter_window_estimate` (gauge): estimated requests per window, by minutes

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::{ProbeError, ProbeResult};

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> ProbeResult<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| ProbeError::Metrics(e.to_string()))?;

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_probe(outcome: &'static str) {
    metrics::counter!("rate_unlimiter_probes_total", "outcome" => outcome).increment(1);
}

pub fn record_request_rate(requests_per_minute: f64) {
    metrics::gauge!("rate_unlimiter_request_rate").set(requests_per_minute);
}

pub fn record_delay(seconds: f64) {
    metrics::gauge!("rate_unlimiter_current_delay_seconds").set(seconds);
}

pub fn record_consecutive_blocks(count: u32) {
    metrics::gauge!("rate_unlimiter_consecutive_blocks").set(count as f64);
}

pub fn record_window_estimate(minutes: u64, requests: u64) {
    metrics::gauge!("rate_unlimiter_window_estimate", "minutes" => minutes.to_string())
        .set(requests as f64);
}
