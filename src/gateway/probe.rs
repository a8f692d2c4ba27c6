//! Reachability probe.
//!
//! # Responsibilities
//! - Ping the check host, optionally out of a given interface
//! - Bound every probe by a hard deadline
//! - Collapse every failure mode to `false`

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time;

use crate::config::ProbeConfig;

/// `ping`-based reachability test.
#[derive(Debug, Clone)]
pub struct PingProbe {
    host: String,
    count: u32,
    reply_timeout: Duration,
    deadline: Duration,
    program: String,
}

impl PingProbe {
    pub fn new(host: impl Into<String>, config: &ProbeConfig) -> Self {
        Self {
            host: host.into(),
            count: config.count,
            reply_timeout: config.reply_timeout(),
            deadline: config.deadline(),
            program: "ping".to_string(),
        }
    }

    /// Use a different ping binary (e.g. an absolute path).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, interface: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-c")
            .arg(self.count.to_string())
            .arg("-W")
            .arg(self.reply_timeout.as_secs().max(1).to_string());
        if let Some(iface) = interface {
            cmd.arg("-I").arg(iface);
        }
        cmd.arg(&self.host)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// Returns true only when the host answered.
    pub async fn reachable(&self, interface: Option<&str>) -> bool {
        let mut cmd = self.command(interface);

        match time::timeout(self.deadline, cmd.status()).await {
            Ok(Ok(status)) => {
                let success = status.success();
                tracing::debug!(
                    host = %self.host,
                    interface = interface.unwrap_or("-"),
                    status = %status,
                    reachable = success,
                    "Probe finished"
                );
                success
            }
            Ok(Err(e)) => {
                tracing::debug!(host = %self.host, error = %e, "Probe failed: could not run ping");
                false
            }
            Err(_) => {
                tracing::warn!(
                    host = %self.host,
                    interface = interface.unwrap_or("-"),
                    deadline_secs = self.deadline.as_secs(),
                    "Probe failed: timeout"
                );
                false
            }
        }
    }
}
