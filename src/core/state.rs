//! # Controller lifecycle state.
//!
//! ```text
//!            suspend()              all prepared            all suspended
//! RUNNING ─────────────► PRE_SUSPEND ───────────► SUSPENDING ───────────► SUSPENDED
//!    ▲                        │                        │                      │
//!    └──────────── resume() ──┴────────────────────────┴──────────────────────┘
//! ```
//! `RUNNING` and `SUSPENDED` are the rest states. The controller is constructed in
//! `SUSPENDED` and leaves it at boot completion.

use std::fmt;

/// Suspend/resume lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuspendState {
    /// Accepting work.
    Running,
    /// Activities are preparing (no longer accepting new work).
    PreSuspend,
    /// Activities are draining in-flight work.
    Suspending,
    /// Drained; no activity is doing work.
    Suspended,
}

impl SuspendState {
    /// Upper-case name as exposed by management tooling.
    pub fn as_str(self) -> &'static str {
        match self {
            SuspendState::Running => "RUNNING",
            SuspendState::PreSuspend => "PRE_SUSPEND",
            SuspendState::Suspending => "SUSPENDING",
            SuspendState::Suspended => "SUSPENDED",
        }
    }

    /// True while a drain is in progress.
    #[inline]
    pub fn is_draining(self) -> bool {
        matches!(self, SuspendState::PreSuspend | SuspendState::Suspending)
    }
}

impl fmt::Display for SuspendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of the current lifecycle state.
pub trait SuspensionStateProvider {
    /// Returns the current state.
    fn state(&self) -> SuspendState;
}
