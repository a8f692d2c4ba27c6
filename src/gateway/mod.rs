//! Connectivity gateway subsystem.
//!
//! # Data Flow
//! ```text
//! FailoverController
//!     → ConnectivityGateway (trait, this file)
//!         → network_manager.rs (nmcli / busctl against NetworkManager)
//!         → probe.rs (ping, optionally bound to an interface)
//! ```
//!
//! # Design Decisions
//! - The trait is the only seam the controller calls outward; tests
//!   substitute a scripted fake
//! - Probes never fail: every problem collapses to "unreachable"
//! - Activation returns once the request is accepted, not once the link is up

pub mod network_manager;
pub mod probe;
pub mod types;

use std::future::Future;
use std::time::Duration;

pub use network_manager::NetworkManagerGateway;
pub use probe::PingProbe;
pub use types::{ActiveConnection, Connection, GatewayError, GatewayResult, LinkType};

/// Capabilities the failover controller needs from the host.
pub trait ConnectivityGateway: Send + Sync {
    /// Bounded-time reachability test against the configured target,
    /// optionally forced out of `interface`.
    fn probe(&self, interface: Option<&str>) -> impl Future<Output = bool> + Send;

    /// Every connection the manager knows about.
    fn list_connections(&self) -> impl Future<Output = GatewayResult<Vec<Connection>>> + Send;

    /// Connections that are currently up, with bound devices resolved.
    fn list_active_connections(
        &self,
    ) -> impl Future<Output = GatewayResult<Vec<ActiveConnection>>> + Send;

    /// Request that the named connection be brought up.
    fn activate(&self, connection_id: &str) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Request that the named connection be taken down.
    fn deactivate(&self, connection_id: &str) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Disable autoconnect and demote routing for the backup connection.
    fn configure_backup_link(
        &self,
        connection_id: &str,
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Tell the manager's own connectivity checker about our poll cadence.
    fn configure_probe_interval(
        &self,
        poll_interval: Duration,
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Names of the connections watched as primary paths.
    fn primary_connection_ids(
        &self,
        backup_id: &str,
    ) -> impl Future<Output = GatewayResult<Vec<String>>> + Send {
        async move {
            let connections = self.list_connections().await?;
            Ok(primary_connection_ids(&connections, backup_id))
        }
    }
}

/// Monitored physical links other than the backup, in enumeration order.
pub fn primary_connection_ids(connections: &[Connection], backup_id: &str) -> Vec<String> {
    connections
        .iter()
        .filter(|c| c.id != backup_id && c.link_type.is_monitored())
        .map(|c| c.id.clone())
        .collect()
}

/// Interval handed to the manager's checker: half the poll interval, at least 1s.
pub fn manager_check_interval(poll_interval: Duration) -> u64 {
    (poll_interval.as_secs() / 2).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn conn(id: &str, raw_type: &str) -> Connection {
        Connection {
            id: id.into(),
            link_type: LinkType::from_manager_type(raw_type),
            handle: id.into(),
            uuid: Uuid::new_v4(),
        }
    }

    #[test]
    fn primary_ids_skip_backup_and_virtual_links() {
        let connections = vec![
            conn("Wired 1", "802-3-ethernet"),
            conn("lte0", "802-3-ethernet"),
            conn("home-wifi", "802-11-wireless"),
            conn("office-vpn", "vpn"),
            conn("lo", "loopback"),
        ];

        assert_eq!(
            primary_connection_ids(&connections, "lte0"),
            vec!["Wired 1".to_string(), "home-wifi".to_string()]
        );
    }

    #[test]
    fn manager_interval_is_half_with_floor() {
        assert_eq!(manager_check_interval(Duration::from_secs(30)), 15);
        assert_eq!(manager_check_interval(Duration::from_secs(3)), 1);
        assert_eq!(manager_check_interval(Duration::from_secs(1)), 1);
    }
}
