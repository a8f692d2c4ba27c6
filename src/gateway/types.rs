//! Connection snapshots and gateway error definitions.

use thiserror::Error;
use uuid::Uuid;

/// Classification of a connection profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkType {
    Wired,
    Wireless,
    /// Anything else (VPN, GSM, bridge, loopback...), raw manager type kept.
    Other(String),
}

impl LinkType {
    /// Map a NetworkManager connection type onto a link class.
    pub fn from_manager_type(raw: &str) -> Self {
        match raw {
            "802-3-ethernet" | "ethernet" => LinkType::Wired,
            "802-11-wireless" | "wifi" => LinkType::Wireless,
            other => LinkType::Other(other.to_string()),
        }
    }

    /// Physical link classes watched as primary paths.
    pub fn is_monitored(&self) -> bool {
        matches!(self, LinkType::Wired | LinkType::Wireless)
    }
}

/// A connection known to the manager. Fetched fresh on every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Unique human-readable name.
    pub id: String,
    pub link_type: LinkType,
    /// Manager-specific reference used to address the connection.
    pub handle: String,
    pub uuid: Uuid,
}

/// A connection that is currently up, with the interfaces bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveConnection {
    pub connection: Connection,
    /// Bound interface names in manager order. May be empty while the
    /// connection is still coming up.
    pub devices: Vec<String>,
}

impl ActiveConnection {
    pub fn id(&self) -> &str {
        &self.connection.id
    }

    /// The only interface used when probing this connection.
    pub fn first_device(&self) -> Option<&str> {
        self.devices.first().map(String::as_str)
    }
}

/// Errors that can occur while talking to the connection manager.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The manager tool could not be started at all.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The manager rejected the request.
    #[error("{program} exited with {status}: {stderr}")]
    Command {
        program: String,
        status: String,
        stderr: String,
    },

    /// No connection with this name exists.
    #[error("connection '{0}' not found")]
    UnknownConnection(String),

    /// The connection exists but is not currently active.
    #[error("connection '{0}' is not active")]
    NotActive(String),

    /// Manager output could not be understood.
    #[error("unexpected manager output: {0}")]
    Parse(String),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_manager_types() {
        assert_eq!(LinkType::from_manager_type("802-3-ethernet"), LinkType::Wired);
        assert_eq!(LinkType::from_manager_type("wifi"), LinkType::Wireless);
        assert_eq!(
            LinkType::from_manager_type("gsm"),
            LinkType::Other("gsm".into())
        );
        assert!(LinkType::Wireless.is_monitored());
        assert!(!LinkType::Other("vpn".into()).is_monitored());
    }

    #[test]
    fn first_device_ignores_the_rest() {
        let active = ActiveConnection {
            connection: Connection {
                id: "bond".into(),
                link_type: LinkType::Wired,
                handle: "h".into(),
                uuid: Uuid::nil(),
            },
            devices: vec!["eth0".into(), "eth1".into()],
        };
        assert_eq!(active.first_device(), Some("eth0"));
    }
}
