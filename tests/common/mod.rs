//! Shared utilities for controller integration tests.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use uuid::Uuid;
use wan_failover::failover::FailoverSettings;
use wan_failover::gateway::{
    ActiveConnection, Connection, ConnectivityGateway, GatewayError, GatewayResult, LinkType,
};

pub const BACKUP: &str = "lte0";

/// Every call the controller made, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Probe(Option<String>),
    ListConnections,
    ListActive,
    Activate(String),
    Deactivate(String),
    ConfigureBackupLink(String),
    ConfigureProbeInterval(Duration),
}

#[derive(Default)]
struct Inner {
    connections: Vec<Connection>,
    active: Vec<ActiveConnection>,
    unbound: VecDeque<bool>,
    default_unbound: bool,
    reachable_devices: HashSet<String>,
    fail_activate: bool,
    fail_deactivate: bool,
    fail_enumeration: bool,
    fail_configure_interval: bool,
    calls: Vec<Call>,
}

/// Scripted in-memory gateway.
#[derive(Default)]
pub struct FakeGateway {
    inner: Mutex<Inner>,
}

impl FakeGateway {
    /// Gateway that knows only the backup connection.
    pub fn new() -> Self {
        let gateway = Self::default();
        gateway.add_connection(BACKUP, LinkType::Other("gsm".into()));
        gateway
    }

    pub fn add_connection(&self, id: &str, link_type: LinkType) {
        let uuid = Uuid::new_v4();
        self.inner.lock().unwrap().connections.push(Connection {
            id: id.into(),
            link_type,
            handle: uuid.to_string(),
            uuid,
        });
    }

    /// Mark a known connection active with the given bound devices.
    pub fn set_active(&self, id: &str, devices: &[&str]) {
        let mut inner = self.inner.lock().unwrap();
        let connection = inner
            .connections
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .expect("unknown connection in test setup");
        inner.active.retain(|c| c.connection.id != id);
        inner.active.push(ActiveConnection {
            connection,
            devices: devices.iter().map(|d| d.to_string()).collect(),
        });
    }

    /// Results returned by successive unbound probes; afterwards the default.
    pub fn script_unbound(&self, results: &[bool]) {
        self.inner.lock().unwrap().unbound.extend(results.iter().copied());
    }

    pub fn set_default_unbound(&self, reachable: bool) {
        self.inner.lock().unwrap().default_unbound = reachable;
    }

    pub fn set_device_reachable(&self, device: &str, reachable: bool) {
        let mut inner = self.inner.lock().unwrap();
        if reachable {
            inner.reachable_devices.insert(device.to_string());
        } else {
            inner.reachable_devices.remove(device);
        }
    }

    pub fn fail_activate(&self, fail: bool) {
        self.inner.lock().unwrap().fail_activate = fail;
    }

    pub fn fail_deactivate(&self, fail: bool) {
        self.inner.lock().unwrap().fail_deactivate = fail;
    }

    pub fn fail_enumeration(&self, fail: bool) {
        self.inner.lock().unwrap().fail_enumeration = fail;
    }

    pub fn fail_configure_interval(&self, fail: bool) {
        self.inner.lock().unwrap().fail_configure_interval = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    pub fn activations(&self) -> usize {
        self.count(|c| matches!(c, Call::Activate(_)))
    }

    pub fn deactivations(&self) -> usize {
        self.count(|c| matches!(c, Call::Deactivate(_)))
    }

    pub fn unbound_probes(&self) -> usize {
        self.count(|c| matches!(c, Call::Probe(None)))
    }

    /// Interfaces probed explicitly, in order.
    pub fn bound_probes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Probe(Some(dev)) => Some(dev),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.inner.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    fn enumeration_error() -> GatewayError {
        GatewayError::Command {
            program: "nmcli".into(),
            status: "exit status: 8".into(),
            stderr: "NetworkManager is not running".into(),
        }
    }
}

impl ConnectivityGateway for FakeGateway {
    async fn probe(&self, interface: Option<&str>) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Probe(interface.map(str::to_string)));
        match interface {
            None => {
                let default = inner.default_unbound;
                inner.unbound.pop_front().unwrap_or(default)
            }
            Some(dev) => inner.reachable_devices.contains(dev),
        }
    }

    async fn list_connections(&self) -> GatewayResult<Vec<Connection>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::ListConnections);
        if inner.fail_enumeration {
            return Err(Self::enumeration_error());
        }
        Ok(inner.connections.clone())
    }

    async fn list_active_connections(&self) -> GatewayResult<Vec<ActiveConnection>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::ListActive);
        if inner.fail_enumeration {
            return Err(Self::enumeration_error());
        }
        Ok(inner.active.clone())
    }

    async fn activate(&self, connection_id: &str) -> GatewayResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Activate(connection_id.into()));
        if inner.fail_activate {
            return Err(GatewayError::Command {
                program: "nmcli".into(),
                status: "exit status: 4".into(),
                stderr: "Connection activation failed".into(),
            });
        }
        let connection = inner
            .connections
            .iter()
            .find(|c| c.id == connection_id)
            .cloned()
            .ok_or_else(|| GatewayError::UnknownConnection(connection_id.into()))?;
        inner.active.retain(|c| c.connection.id != connection_id);
        inner.active.push(ActiveConnection {
            connection,
            devices: vec!["wwan0".into()],
        });
        Ok(())
    }

    async fn deactivate(&self, connection_id: &str) -> GatewayResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Deactivate(connection_id.into()));
        if inner.fail_deactivate {
            return Err(GatewayError::Command {
                program: "nmcli".into(),
                status: "exit status: 10".into(),
                stderr: "Connection deactivation failed".into(),
            });
        }
        let before = inner.active.len();
        inner.active.retain(|c| c.connection.id != connection_id);
        if inner.active.len() == before {
            return Err(GatewayError::NotActive(connection_id.into()));
        }
        Ok(())
    }

    async fn configure_backup_link(&self, connection_id: &str) -> GatewayResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::ConfigureBackupLink(connection_id.into()));
        if inner.connections.iter().any(|c| c.id == connection_id) {
            Ok(())
        } else {
            Err(GatewayError::UnknownConnection(connection_id.into()))
        }
    }

    async fn configure_probe_interval(&self, poll_interval: Duration) -> GatewayResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::ConfigureProbeInterval(poll_interval));
        if inner.fail_configure_interval {
            return Err(GatewayError::Command {
                program: "busctl".into(),
                status: "exit status: 1".into(),
                stderr: "Property 'ConnectivityCheckInterval' is not writable".into(),
            });
        }
        Ok(())
    }
}

/// Controller settings used by most tests.
pub fn settings(threshold: u32) -> FailoverSettings {
    FailoverSettings {
        backup_connection: BACKUP.into(),
        poll_interval: Duration::from_secs(30),
        failover_threshold: threshold,
        backup_script: None,
    }
}

pub fn settings_with_hook(threshold: u32, hook: &str) -> FailoverSettings {
    FailoverSettings {
        backup_script: Some(PathBuf::from(hook)),
        ..settings(threshold)
    }
}

/// A gateway with one wired primary "eth0" bound to "en0".
pub fn wired_host() -> FakeGateway {
    let gateway = FakeGateway::new();
    gateway.add_connection("eth0", LinkType::Wired);
    gateway.set_active("eth0", &["en0"]);
    gateway
}
