//! Metrics collection and exposition.
//!
//! # Metrics
//! - `wan_failover_cycles_total` (counter): poll cycles by outcome
//! - `wan_failover_activations_total` (counter): backup activations by result
//! - `wan_failover_deactivations_total` (counter): backup deactivations by result
//! - `wan_failover_cycle_errors_total` (counter): cycles aborted by gateway errors
//! - `wan_failover_backup_active` (gauge): 1=backup up, 0=primary
//! - `wan_failover_consecutive_failures` (gauge): current failure streak

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::failover::{CycleOutcome, FailoverState};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record the result of one poll cycle.
pub fn record_cycle(outcome: &CycleOutcome, state: &FailoverState) {
    ::metrics::counter!("wan_failover_cycles_total", "outcome" => outcome.label()).increment(1);

    match outcome {
        CycleOutcome::FailedOver { .. } => {
            ::metrics::counter!("wan_failover_activations_total", "result" => "ok").increment(1);
        }
        CycleOutcome::ActivationFailed { .. } => {
            ::metrics::counter!("wan_failover_activations_total", "result" => "error").increment(1);
        }
        CycleOutcome::FailedBack { .. } => {
            ::metrics::counter!("wan_failover_deactivations_total", "result" => "ok").increment(1);
        }
        CycleOutcome::DeactivationFailed { .. } => {
            ::metrics::counter!("wan_failover_deactivations_total", "result" => "error").increment(1);
        }
        CycleOutcome::Aborted => {
            ::metrics::counter!("wan_failover_cycle_errors_total").increment(1);
        }
        _ => {}
    }

    ::metrics::gauge!("wan_failover_backup_active").set(if state.backup_active() { 1.0 } else { 0.0 });
    ::metrics::gauge!("wan_failover_consecutive_failures").set(f64::from(state.consecutive_failures()));
}
