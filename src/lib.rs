//! WAN link-failover controller library.
//!
//! Watches whether the primary network path reaches the internet and moves
//! traffic onto a backup NetworkManager connection when it does not,
//! reverting as soon as a primary device can reach the check host again.

pub mod config;
pub mod failover;
pub mod gateway;
pub mod lifecycle;
pub mod observability;

pub use config::schema::FailoverConfig;
pub use failover::{CycleOutcome, FailoverController, FailoverSettings, FailoverState};
pub use gateway::{ConnectivityGateway, NetworkManagerGateway};
pub use lifecycle::Shutdown;
