//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (interval > 0, threshold > 0, probe counts)
//! - Check that addresses parse when the feature using them is enabled
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FailoverConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::FailoverConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be at least {min}, got {actual}")]
    TooSmall {
        field: &'static str,
        min: u64,
        actual: u64,
    },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &FailoverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backup_connection_name.trim().is_empty() {
        errors.push(ValidationError::Empty {
            field: "backup_connection_name",
        });
    }

    if config.check_host.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "check_host" });
    }

    check_min(&mut errors, "check_interval_secs", config.check_interval_secs, 1);
    check_min(
        &mut errors,
        "failover_threshold",
        u64::from(config.failover_threshold),
        1,
    );
    check_min(&mut errors, "probe.count", u64::from(config.probe.count), 1);
    check_min(
        &mut errors,
        "probe.reply_timeout_secs",
        config.probe.reply_timeout_secs,
        1,
    );
    if let Some(deadline) = config.probe.deadline_secs {
        check_min(&mut errors, "probe.deadline_secs", deadline, 1);
    }

    if config.metrics.enabled && config.metrics.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "metrics.address",
            value: config.metrics.address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_min(errors: &mut Vec<ValidationError>, field: &'static str, actual: u64, min: u64) {
    if actual < min {
        errors.push(ValidationError::TooSmall { field, min, actual });
    }
}
