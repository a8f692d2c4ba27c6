//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the daemon.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the failover daemon.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FailoverConfig {
    /// Connection name (NetworkManager `id`) used as the failover path.
    pub backup_connection_name: String,

    /// Host probed to decide whether the internet is reachable.
    pub check_host: String,

    /// Poll interval in seconds.
    pub check_interval_secs: u64,

    /// Consecutive failed probes required before switching to the backup.
    pub failover_threshold: u32,

    /// Executable run right after the backup link has been activated.
    pub backup_script: Option<PathBuf>,

    /// Reachability probe tuning.
    pub probe: ProbeConfig,

    /// Settings applied to the backup connection at startup.
    pub backup_link: BackupLinkConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Metrics settings.
    pub metrics: MetricsConfig,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            backup_connection_name: "lte0".to_string(),
            check_host: "8.8.8.8".to_string(),
            check_interval_secs: 30,
            failover_threshold: 2,
            backup_script: Some(PathBuf::from("/bin/enable_lte.sh")),
            probe: ProbeConfig::default(),
            backup_link: BackupLinkConfig::default(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl FailoverConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Hook path, treating an empty string as "no hook".
    pub fn backup_script(&self) -> Option<PathBuf> {
        self.backup_script
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .cloned()
    }
}

/// Reachability probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Echo requests sent per probe.
    pub count: u32,

    /// Per-reply wait in seconds.
    pub reply_timeout_secs: u64,

    /// Hard upper bound on a single probe in seconds.
    /// Defaults to `count * reply_timeout_secs + 2` when unset.
    pub deadline_secs: Option<u64>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            count: 3,
            reply_timeout_secs: 3,
            deadline_secs: None,
        }
    }
}

impl ProbeConfig {
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }

    pub fn deadline(&self) -> Duration {
        let secs = self.deadline_secs.unwrap_or_else(|| {
            u64::from(self.count)
                .saturating_mul(self.reply_timeout_secs)
                .saturating_add(2)
        });
        Duration::from_secs(secs)
    }
}

/// Backup connection settings applied once at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackupLinkConfig {
    /// Route metric for IPv4 and IPv6. Higher than the primary's so the
    /// primary wins while both are up, but still a usable route.
    pub route_metric: u32,

    /// Whether NetworkManager may bring the backup up on its own.
    pub autoconnect: bool,
}

impl Default for BackupLinkConfig {
    fn default() -> Self {
        Self {
            route_metric: 90,
            autoconnect: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Optional file that receives a copy of every log line.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            file: None,
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the Prometheus scrape endpoint.
    pub enabled: bool,

    /// Scrape endpoint bind address.
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "127.0.0.1:9101".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_values() {
        let config = FailoverConfig::default();
        assert_eq!(config.backup_connection_name, "lte0");
        assert_eq!(config.check_host, "8.8.8.8");
        assert_eq!(config.check_interval(), Duration::from_secs(30));
        assert_eq!(config.failover_threshold, 2);
        assert_eq!(config.backup_link.route_metric, 90);
        assert!(!config.backup_link.autoconnect);
    }

    #[test]
    fn probe_deadline_covers_all_replies() {
        let probe = ProbeConfig::default();
        assert_eq!(probe.deadline(), Duration::from_secs(11));

        let probe = ProbeConfig {
            deadline_secs: Some(4),
            ..ProbeConfig::default()
        };
        assert_eq!(probe.deadline(), Duration::from_secs(4));
    }

    #[test]
    fn empty_backup_script_means_no_hook() {
        let config = FailoverConfig {
            backup_script: Some(PathBuf::new()),
            ..FailoverConfig::default()
        };
        assert!(config.backup_script().is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: FailoverConfig = toml::from_str(
            r#"
            backup_connection_name = "wwan0"
            failover_threshold = 4

            [probe]
            count = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.backup_connection_name, "wwan0");
        assert_eq!(config.failover_threshold, 4);
        assert_eq!(config.check_interval_secs, 30);
        assert_eq!(config.probe.count, 1);
        assert_eq!(config.probe.reply_timeout_secs, 3);
    }
}
