//! Metrics collection and exposition.
//!
//! # Metrics
//! - `safe_relay_rpc_failures_total` (counter): failed runtime RPC attempts by method
//! - `safe_relay_gas_estimate` (histogram): safeTxGas estimates by source
//! - `safe_relay_refinement_attempts` (histogram): dry-runs per refined estimate
//! - `safe_relay_proposals_total` (counter): proposals by outcome
//! - `safe_relay_status_poll_failures_total` (counter): swallowed polling failures by stage

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_rpc_failure(method: &'static str) {
    ::metrics::counter!("safe_relay_rpc_failures_total", "method" => method).increment(1);
}

pub fn record_gas_estimate(source: &'static str, gas: u64) {
    ::metrics::histogram!("safe_relay_gas_estimate", "source" => source).record(gas as f64);
}

pub fn record_refinement_attempts(attempts: u32) {
    ::metrics::histogram!("safe_relay_refinement_attempts").record(f64::from(attempts));
}

pub fn record_proposal(outcome: &'static str) {
    ::metrics::counter!("safe_relay_proposals_total", "outcome" => outcome).increment(1);
}

pub fn record_poll_failure(stage: &'static str) {
    ::metrics::counter!("safe_relay_status_poll_failures_total", "stage" => stage).increment(1);
}
