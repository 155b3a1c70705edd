//! # LogWriter: tracing event renderer
//!
//! A minimal subscriber that renders incoming [`Event`]s through `tracing`.
//!
//! ## Example output
//! ```text
//! INFO  [suspend-requested] timeout_ms=Some(5000)
//! DEBUG [phase] phase=Some(Prepare) priority=Some(0)
//! WARN  [activity-failed] activity="http" phase=Some(Suspend) reason="boom"
//! WARN  [suspend-timeout] timeout_ms=Some(5000)
//! INFO  [suspended]
//! INFO  [resume-requested]
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let activity = e.activity.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::SuspendRequested => {
                tracing::info!(seq = e.seq, timeout_ms = ?e.timeout_ms, "[suspend-requested]");
            }
            EventKind::PhaseStarted => {
                tracing::debug!(seq = e.seq, phase = ?e.phase, priority = ?e.priority, "[phase]");
            }
            EventKind::SuspendCompleted => {
                tracing::info!(seq = e.seq, "[suspended]");
            }
            EventKind::SuspendTimedOut => {
                tracing::warn!(seq = e.seq, timeout_ms = ?e.timeout_ms, "[suspend-timeout]");
            }
            EventKind::SuspendCancelled => {
                tracing::info!(seq = e.seq, "[suspend-cancelled]");
            }
            EventKind::ResumeRequested => {
                tracing::info!(seq = e.seq, "[resume-requested]");
            }
            EventKind::ResumeCompleted => {
                tracing::info!(seq = e.seq, "[resumed]");
            }
            EventKind::ActivityFailed => {
                tracing::warn!(
                    seq = e.seq,
                    activity,
                    phase = ?e.phase,
                    reason = e.reason.as_deref().unwrap_or("unknown"),
                    "[activity-failed]"
                );
            }
            EventKind::ActivityRegistered => {
                tracing::debug!(seq = e.seq, activity, priority = ?e.priority, "[registered]");
            }
            EventKind::ActivityUnregistered => {
                tracing::debug!(seq = e.seq, activity, priority = ?e.priority, "[unregistered]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
