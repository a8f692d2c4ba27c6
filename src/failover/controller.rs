//! Failover controller: the polling loop and its side effects.
//!
//! # Responsibilities
//! - Configure the backup link once at startup
//! - Poll connectivity on a fixed interval
//! - Feed results into [`FailoverState`] and issue activate/deactivate
//! - Run the post-failover hook after a successful activation
//!
//! # Design Decisions
//! - One cycle at a time; the next starts only after the full interval sleep
//! - Every gateway error ends the cycle without a state change
//! - At most one of activate/deactivate is issued per cycle
//! - Shutdown is observed at the sleep boundary; link state is left as is

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::config::FailoverConfig;
use crate::failover::hook;
use crate::failover::state::FailoverState;
use crate::gateway::{ActiveConnection, ConnectivityGateway, GatewayError, GatewayResult};
use crate::observability::metrics;

/// Immutable controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailoverSettings {
    pub backup_connection: String,
    pub poll_interval: Duration,
    pub failover_threshold: u32,
    pub backup_script: Option<PathBuf>,
}

impl From<&FailoverConfig> for FailoverSettings {
    fn from(config: &FailoverConfig) -> Self {
        Self {
            backup_connection: config.backup_connection_name.clone(),
            poll_interval: config.check_interval(),
            failover_threshold: config.failover_threshold,
            backup_script: config.backup_script(),
        }
    }
}

/// What happened to the post-failover hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    NotConfigured,
    Succeeded,
    Failed,
}

/// Result of a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Backup down and the unbound probe succeeded.
    PrimaryHealthy,
    /// Unbound probe failed, threshold not reached yet.
    Degraded { failures: u32 },
    /// Backup activation accepted.
    FailedOver { hook: HookOutcome },
    /// Threshold reached but the manager rejected activation.
    ActivationFailed { failures: u32 },
    /// A primary device reached the internet and the backup was taken down.
    FailedBack { connection: String, device: String },
    /// A primary device recovered but deactivation was rejected.
    DeactivationFailed { connection: String },
    /// Backup stays up; `internet` is the unbound probe result.
    HoldingBackup { internet: bool },
    /// Enumeration failed; nothing was changed.
    Aborted,
}

impl CycleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::PrimaryHealthy => "primary_healthy",
            CycleOutcome::Degraded { .. } => "degraded",
            CycleOutcome::FailedOver { .. } => "failed_over",
            CycleOutcome::ActivationFailed { .. } => "activation_failed",
            CycleOutcome::FailedBack { .. } => "failed_back",
            CycleOutcome::DeactivationFailed { .. } => "deactivation_failed",
            CycleOutcome::HoldingBackup { .. } => "holding_backup",
            CycleOutcome::Aborted => "aborted",
        }
    }
}

/// Connection snapshot taken once per cycle.
struct Observation {
    active: Vec<ActiveConnection>,
    primary_ids: Vec<String>,
}

impl Observation {
    fn is_primary(&self, connection: &ActiveConnection) -> bool {
        self.primary_ids.iter().any(|id| id == connection.id())
    }
}

pub struct FailoverController<G> {
    gateway: Arc<G>,
    settings: FailoverSettings,
    state: FailoverState,
}

impl<G: ConnectivityGateway> FailoverController<G> {
    pub fn new(gateway: Arc<G>, settings: FailoverSettings) -> Self {
        Self {
            gateway,
            settings,
            state: FailoverState::new(),
        }
    }

    pub fn state(&self) -> &FailoverState {
        &self.state
    }

    /// One-time link setup. Failures are logged and never fatal.
    pub async fn prepare(&self) {
        if let Err(e) = self
            .gateway
            .configure_probe_interval(self.settings.poll_interval)
            .await
        {
            tracing::warn!(error = %e, "Failed to configure NetworkManager connectivity checking");
        }

        match self
            .gateway
            .configure_backup_link(&self.settings.backup_connection)
            .await
        {
            Ok(()) => {}
            Err(GatewayError::UnknownConnection(name)) => {
                tracing::warn!(connection = %name, "Backup connection not found");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to configure backup connection");
            }
        }
    }

    /// Prepare the links, then poll until `shutdown` fires.
    ///
    /// Returns the final state for inspection; nothing is torn down.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> FailoverState {
        tracing::info!(
            backup = %self.settings.backup_connection,
            interval_secs = self.settings.poll_interval.as_secs(),
            threshold = self.settings.failover_threshold,
            "Starting WAN failover monitoring"
        );

        self.prepare().await;

        loop {
            let outcome = self.run_cycle().await;
            metrics::record_cycle(&outcome, &self.state);

            tokio::select! {
                _ = time::sleep(self.settings.poll_interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Stopping WAN failover monitoring");
                    break;
                }
            }
        }

        self.state
    }

    /// Probe, decide and act once.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let internet = self.gateway.probe(None).await;

        let observation = match self.observe().await {
            Ok(observation) => observation,
            Err(e) => {
                tracing::error!(error = %e, "Error in monitoring loop, skipping cycle");
                return CycleOutcome::Aborted;
            }
        };

        // Informational only: the decision below ignores whether a primary
        // connection is actually up.
        let primary_active = observation.active.iter().any(|c| observation.is_primary(c));
        tracing::debug!(
            primary = ?observation.primary_ids,
            active = ?observation.active.iter().map(|c| c.id()).collect::<Vec<_>>(),
            primary_active,
            internet,
            backup_active = self.state.backup_active(),
            failures = self.state.consecutive_failures(),
            "Poll cycle"
        );

        if !self.state.backup_active() && !internet {
            self.on_primary_failure().await
        } else if self.state.backup_active() {
            self.on_backup_active(internet, &observation).await
        } else {
            self.state.reset_failures();
            tracing::debug!("Primary connection active with internet - reset failure counter");
            CycleOutcome::PrimaryHealthy
        }
    }

    async fn observe(&self) -> GatewayResult<Observation> {
        let active = self.gateway.list_active_connections().await?;
        let primary_ids = self
            .gateway
            .primary_connection_ids(&self.settings.backup_connection)
            .await?;
        Ok(Observation { active, primary_ids })
    }

    async fn on_primary_failure(&mut self) -> CycleOutcome {
        let threshold = self.settings.failover_threshold;
        let reached = self.state.record_failure(threshold);
        let failures = self.state.consecutive_failures();

        tracing::info!(
            failures,
            threshold,
            "No internet and backup connection is down"
        );

        if !reached {
            tracing::debug!("Waiting for consecutive failures before activating backup");
            return CycleOutcome::Degraded { failures };
        }

        let backup = &self.settings.backup_connection;
        tracing::info!(backup = %backup, "Activating backup connection after consecutive failures");

        match self.gateway.activate(backup).await {
            Ok(()) => {
                self.state.enter_backup();
                tracing::info!(backup = %backup, "Backup connection active");
                let hook = self.run_hook().await;
                CycleOutcome::FailedOver { hook }
            }
            Err(e) => {
                tracing::error!(backup = %backup, error = %e, failures, "Failed to activate backup connection");
                CycleOutcome::ActivationFailed { failures }
            }
        }
    }

    async fn on_backup_active(&mut self, internet: bool, observation: &Observation) -> CycleOutcome {
        self.state.reset_failures();

        let mut restored = None;
        for connection in observation.active.iter().filter(|c| observation.is_primary(c)) {
            let Some(device) = connection.first_device() else {
                continue;
            };

            if self.gateway.probe(Some(device)).await {
                tracing::info!(
                    connection = %connection.id(),
                    device,
                    "Primary connection has internet access"
                );
                restored = Some((connection.id().to_string(), device.to_string()));
                break;
            }

            tracing::debug!(connection = %connection.id(), device, "Primary connection still without internet");
        }

        let Some((connection, device)) = restored else {
            if internet {
                tracing::debug!("Backup connection carrying traffic, primary not restored");
            } else {
                tracing::info!("Backup connection up, no internet");
            }
            return CycleOutcome::HoldingBackup { internet };
        };

        let backup = &self.settings.backup_connection;
        tracing::info!(backup = %backup, "Primary connection restored - deactivating backup");

        match self.gateway.deactivate(backup).await {
            Ok(()) => {
                self.state.leave_backup();
                tracing::info!(connection = %connection, device = %device, "Failed back to primary");
                CycleOutcome::FailedBack { connection, device }
            }
            Err(e) => {
                tracing::error!(backup = %backup, error = %e, "Failed to deactivate backup connection");
                CycleOutcome::DeactivationFailed { connection }
            }
        }
    }

    async fn run_hook(&self) -> HookOutcome {
        let Some(path) = &self.settings.backup_script else {
            return HookOutcome::NotConfigured;
        };

        match hook::run_hook(path).await {
            Ok(()) => {
                tracing::info!(hook = %path.display(), "Post-failover hook finished");
                HookOutcome::Succeeded
            }
            Err(e) => {
                tracing::warn!(error = %e, "Post-failover hook failed");
                HookOutcome::Failed
            }
        }
    }
}
