//! Post-failover hook execution.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::Command;

/// Failure of the post-failover executable.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("failed to run {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status}", .path.display())]
    Failed { path: PathBuf, status: ExitStatus },
}

/// Run the hook to completion with output discarded.
pub async fn run_hook(path: &Path) -> Result<(), HookError> {
    let status = Command::new(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|source| HookError::Spawn {
            path: path.to_path_buf(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(HookError::Failed {
            path: path.to_path_buf(),
            status,
        })
    }
}
