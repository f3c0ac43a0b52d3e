//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guestbook_read_calls_total` (counter): read-calls by result
//! - `guestbook_submissions_total` (counter): signing attempts by outcome
//! - `guestbook_confirmation_seconds` (histogram): time from send to confirmation
//! - `guestbook_connection_state` (counter): connection transitions by state
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_read_call(ok: bool) {
    let result = if ok { "ok" } else { "error" };
    counter!("guestbook_read_calls_total", "result" => result).increment(1);
}

pub fn record_submission(outcome: &'static str) {
    counter!("guestbook_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_confirmation_time(elapsed: Duration) {
    histogram!("guestbook_confirmation_seconds").record(elapsed.as_secs_f64());
}

pub fn record_connection_state(state: &'static str) {
    counter!("guestbook_connection_state", "state" => state).increment(1);
}
