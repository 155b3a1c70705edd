//! # Cross-platform OS signal handling.
//!
//! Provides [`wait_for_shutdown_signal`], an async helper that completes when the process
//! receives a termination signal, and [`suspend_on_signal`], which turns that signal into
//! a graceful suspend.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::time::Duration;

use super::controller::SuspendController;
use crate::error::RuntimeError;

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Waits for a termination signal, then drains `controller` within `grace`.
///
/// Returns once the controller is `Suspended`, or with
/// [`RuntimeError::GraceExceeded`] listing the activities still pending.
pub async fn suspend_on_signal(
    controller: &SuspendController,
    grace: Duration,
) -> Result<(), RuntimeError> {
    wait_for_shutdown_signal().await?;
    tracing::info!(grace_ms = grace.as_millis() as u64, "shutdown signal received; suspending");
    controller.shutdown(grace).await
}
