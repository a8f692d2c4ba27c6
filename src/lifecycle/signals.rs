//! OS signal handling.

use std::io;

use tokio::signal;

/// Resolve once SIGINT or SIGTERM arrives.
#[cfg(unix)]
pub async fn wait_for_signal() -> io::Result<&'static str> {
    use signal::unix::{signal as unix_signal, SignalKind};

    let mut terminate = unix_signal(SignalKind::terminate())?;

    tokio::select! {
        result = signal::ctrl_c() => result.map(|()| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

/// Resolve once Ctrl-C arrives.
#[cfg(not(unix))]
pub async fn wait_for_signal() -> io::Result<&'static str> {
    signal::ctrl_c().await.map(|()| "SIGINT")
}
