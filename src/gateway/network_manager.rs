//! NetworkManager adapter.
//!
//! # Responsibilities
//! - Enumerate known and active connections (`nmcli -t`)
//! - Activate / deactivate connections by name
//! - Apply backup link settings and the manager's own connectivity cadence
//!
//! # Design Decisions
//! - Connections are addressed by UUID once resolved, names can collide
//! - Up and down both use `--wait 0`: a request, not a confirmation
//! - Nothing is cached between calls

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use uuid::Uuid;

use crate::config::{BackupLinkConfig, ProbeConfig};
use crate::gateway::probe::PingProbe;
use crate::gateway::types::{
    ActiveConnection, Connection, GatewayError, GatewayResult, LinkType,
};
use crate::gateway::{manager_check_interval, ConnectivityGateway};

const NMCLI: &str = "nmcli";
const BUSCTL: &str = "busctl";
const NM_SERVICE: &str = "org.freedesktop.NetworkManager";
const NM_OBJECT_PATH: &str = "/org/freedesktop/NetworkManager";
const CONNECTION_FIELDS: &str = "NAME,UUID,TYPE,DEVICE";

/// Gateway backed by NetworkManager's command line tools and `ping`.
#[derive(Debug, Clone)]
pub struct NetworkManagerGateway {
    probe: PingProbe,
    backup_link: BackupLinkConfig,
}

impl NetworkManagerGateway {
    pub fn new(check_host: impl Into<String>, probe: &ProbeConfig, backup_link: BackupLinkConfig) -> Self {
        Self {
            probe: PingProbe::new(check_host, probe),
            backup_link,
        }
    }

    async fn run(&self, program: &str, args: &[&str]) -> GatewayResult<String> {
        tracing::trace!(program, ?args, "Running manager command");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| GatewayError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(GatewayError::Command {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout)
            .map_err(|e| GatewayError::Parse(format!("{program} output is not UTF-8: {e}")))
    }

    async fn show(&self, active_only: bool) -> GatewayResult<Vec<ActiveConnection>> {
        let mut args = vec!["-t", "-f", CONNECTION_FIELDS, "connection", "show"];
        if active_only {
            args.push("--active");
        }
        let stdout = self.run(NMCLI, &args).await?;
        parse_connection_table(&stdout)
    }

    async fn find_known(&self, connection_id: &str) -> GatewayResult<Connection> {
        self.list_connections()
            .await?
            .into_iter()
            .find(|c| c.id == connection_id)
            .ok_or_else(|| GatewayError::UnknownConnection(connection_id.to_string()))
    }

    async fn set_nm_property(&self, property: &str, signature: &str, value: &str) -> GatewayResult<()> {
        self.run(
            BUSCTL,
            &[
                "set-property",
                NM_SERVICE,
                NM_OBJECT_PATH,
                NM_SERVICE,
                property,
                signature,
                value,
            ],
        )
        .await
        .map(|_| ())
    }
}

impl ConnectivityGateway for NetworkManagerGateway {
    async fn probe(&self, interface: Option<&str>) -> bool {
        self.probe.reachable(interface).await
    }

    async fn list_connections(&self) -> GatewayResult<Vec<Connection>> {
        Ok(self
            .show(false)
            .await?
            .into_iter()
            .map(|active| active.connection)
            .collect())
    }

    async fn list_active_connections(&self) -> GatewayResult<Vec<ActiveConnection>> {
        self.show(true).await
    }

    async fn activate(&self, connection_id: &str) -> GatewayResult<()> {
        let target = self.find_known(connection_id).await?;
        self.run(NMCLI, &up_args(&target.handle)).await?;
        tracing::info!(connection = %connection_id, uuid = %target.uuid, "Activation requested");
        Ok(())
    }

    async fn deactivate(&self, connection_id: &str) -> GatewayResult<()> {
        let target = self
            .list_active_connections()
            .await?
            .into_iter()
            .find(|c| c.id() == connection_id)
            .ok_or_else(|| GatewayError::NotActive(connection_id.to_string()))?;
        self.run(NMCLI, &down_args(&target.connection.handle)).await?;
        tracing::info!(connection = %connection_id, "Deactivation requested");
        Ok(())
    }

    async fn configure_backup_link(&self, connection_id: &str) -> GatewayResult<()> {
        let target = self.find_known(connection_id).await?;
        let autoconnect = if self.backup_link.autoconnect { "yes" } else { "no" };
        let metric = self.backup_link.route_metric.to_string();

        self.run(
            NMCLI,
            &[
                "connection",
                "modify",
                "uuid",
                target.handle.as_str(),
                "connection.autoconnect",
                autoconnect,
                "ipv4.route-metric",
                metric.as_str(),
                "ipv6.route-metric",
                metric.as_str(),
            ],
        )
        .await?;

        tracing::info!(
            connection = %connection_id,
            autoconnect,
            route_metric = self.backup_link.route_metric,
            "Configured backup connection"
        );
        Ok(())
    }

    async fn configure_probe_interval(&self, poll_interval: Duration) -> GatewayResult<()> {
        let interval = manager_check_interval(poll_interval);
        self.set_nm_property("ConnectivityCheckEnabled", "b", "true").await?;
        self.set_nm_property("ConnectivityCheckInterval", "u", &interval.to_string())
            .await?;
        tracing::info!(interval_secs = interval, "Configured NetworkManager connectivity checking");
        Ok(())
    }
}

/// `nmcli` arguments that request activation without waiting for link-up.
fn up_args(handle: &str) -> [&str; 6] {
    ["--wait", "0", "connection", "up", "uuid", handle]
}

/// `nmcli` arguments that request deactivation without waiting for teardown.
fn down_args(handle: &str) -> [&str; 6] {
    ["--wait", "0", "connection", "down", "uuid", handle]
}

/// Parse `nmcli -t -f NAME,UUID,TYPE,DEVICE connection show` output.
///
/// Inactive rows come back with an empty device list.
pub fn parse_connection_table(stdout: &str) -> GatewayResult<Vec<ActiveConnection>> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_connection_row)
        .collect()
}

fn parse_connection_row(line: &str) -> GatewayResult<ActiveConnection> {
    let fields = split_terse(line);
    let [name, uuid, raw_type, devices] = fields.as_slice() else {
        return Err(GatewayError::Parse(format!(
            "expected 4 fields, got {}: {line}",
            fields.len()
        )));
    };

    let uuid = Uuid::parse_str(uuid)
        .map_err(|e| GatewayError::Parse(format!("bad uuid '{uuid}': {e}")))?;

    let devices = if devices.is_empty() || devices == "--" {
        Vec::new()
    } else {
        devices.split(',').map(|d| d.trim().to_string()).collect()
    };

    Ok(ActiveConnection {
        connection: Connection {
            id: name.clone(),
            link_type: LinkType::from_manager_type(raw_type),
            handle: uuid.to_string(),
            uuid,
        },
        devices,
    })
}

/// Split a terse nmcli line on unescaped `:`, undoing `\:` and `\\`.
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => current.push('\\'),
            },
            ':' => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}
