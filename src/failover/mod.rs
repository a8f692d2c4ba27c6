//! Failover decision subsystem.
//!
//! # Data Flow
//! ```text
//! controller.rs (fixed-interval loop)
//!     → gateway probe (unbound)
//!     → gateway enumeration (active + primary connections)
//!     → state.rs (hysteresis decision)
//!     → gateway activate / deactivate
//!     → hook.rs (after activation only)
//! ```
//!
//! # Design Decisions
//! - Failover needs `failover_threshold` consecutive failed polls
//! - Failback needs a single successful probe through a primary device
//! - State lives only in memory; a restart starts again on the primary

pub mod controller;
pub mod hook;
pub mod state;

pub use controller::{CycleOutcome, FailoverController, FailoverSettings, HookOutcome};
pub use state::{FailoverState, Phase};
