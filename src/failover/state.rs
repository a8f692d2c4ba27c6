//! Failover hysteresis state.
//!
//! # States
//! - PrimaryOk: backup down, last poll had connectivity
//! - PrimaryDegraded(n): backup down, n consecutive failed polls
//! - BackupActive: backup is believed to carry traffic
//!
//! # State Transitions
//! ```text
//! PrimaryOk/Degraded(n) → Degraded(n+1): unbound probe failed
//! Degraded(n)          → BackupActive:  n >= threshold and activation accepted
//! PrimaryOk/Degraded   → PrimaryOk:     unbound probe succeeded
//! BackupActive         → PrimaryOk:     a primary device probe succeeded
//!                                       and deactivation accepted
//! ```
//!
//! # Design Decisions
//! - Failing over is debounced, failing back is eager
//! - The failure counter is zero whenever the backup is active
//! - The counter saturates at the threshold while activation keeps failing

/// Conceptual phase derived from [`FailoverState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PrimaryOk,
    PrimaryDegraded(u32),
    BackupActive,
}

/// Mutable decision state owned by the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailoverState {
    consecutive_failures: u32,
    backup_active: bool,
}

impl FailoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn backup_active(&self) -> bool {
        self.backup_active
    }

    pub fn phase(&self) -> Phase {
        match (self.backup_active, self.consecutive_failures) {
            (true, _) => Phase::BackupActive,
            (false, 0) => Phase::PrimaryOk,
            (false, n) => Phase::PrimaryDegraded(n),
        }
    }

    /// Count a failed unbound probe while on the primary path.
    ///
    /// Returns true once the threshold is reached and the backup should be
    /// activated.
    pub fn record_failure(&mut self, threshold: u32) -> bool {
        debug_assert!(!self.backup_active);
        let threshold = threshold.max(1);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1).min(threshold);
        self.consecutive_failures >= threshold
    }

    /// Connectivity seen on the primary path, or backup already active.
    pub fn reset_failures(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Backup activation was accepted.
    pub fn enter_backup(&mut self) {
        self.backup_active = true;
        self.consecutive_failures = 0;
    }

    /// Backup deactivation was accepted.
    pub fn leave_backup(&mut self) {
        self.backup_active = false;
        self.consecutive_failures = 0;
    }
}
