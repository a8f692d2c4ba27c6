//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → controller loop exits at its next sleep boundary
//! ```
//!
//! # Design Decisions
//! - Cancellation is cooperative, never a forced abort mid-cycle
//! - Exiting leaves whichever link is up in place

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
