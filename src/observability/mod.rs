//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Controller and gateway produce:
//!     → logging.rs (structured log events, stdout + optional file)
//!     → metrics.rs (cycle counters, backup/failure gauges)
//!
//! Consumers:
//!     → journald / log file
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
