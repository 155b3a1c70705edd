//! # Runtime events emitted by the suspend controller.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Suspend cycle**: requested, phase started, completed, timed out, cancelled
//! - **Resume**: requested, completed
//! - **Registry**: activity registered/unregistered, activity failures
//!
//! The [`Event`] struct carries metadata such as timestamps, activity name, priority,
//! phase and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use suspendvisor::{Event, EventKind, Phase, SuspendPriority};
//!
//! let ev = Event::new(EventKind::ActivityFailed)
//!     .with_activity("http-listener")
//!     .with_phase(Phase::Suspend)
//!     .with_priority(SuspendPriority::DEFAULT)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::ActivityFailed);
//! assert_eq!(ev.activity.as_deref(), Some("http-listener"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::activity::SuspendPriority;
use crate::core::Phase;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Suspend cycle ===
    /// `suspend()` started a new drain.
    ///
    /// Sets:
    /// - `timeout_ms`: advisory timeout, if any
    SuspendRequested,

    /// A priority group entered a phase.
    ///
    /// Sets:
    /// - `phase`: prepare / suspend / resume
    /// - `priority`: group ordinal
    PhaseStarted,

    /// Every activity finished; state is `Suspended`.
    SuspendCompleted,

    /// The advisory timeout elapsed before the drain finished.
    ///
    /// Sets:
    /// - `timeout_ms`: configured timeout
    SuspendTimedOut,

    /// `resume()` cancelled the suspend (in progress or completed).
    SuspendCancelled,

    // === Resume ===
    /// `resume()` was called while not running.
    ResumeRequested,

    /// Every activity finished its resume stage.
    ResumeCompleted,

    // === Activities ===
    /// An activity failed or panicked during a phase; it counts as done.
    ///
    /// Sets:
    /// - `activity`: activity name
    /// - `phase`: phase in progress
    /// - `reason`: failure message
    ActivityFailed,

    /// An activity was registered.
    ///
    /// Sets:
    /// - `activity`, `priority`
    ActivityRegistered,

    /// An activity was unregistered.
    ///
    /// Sets:
    /// - `activity`, `priority`
    ActivityUnregistered,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Activity name, if applicable.
    pub activity: Option<Arc<str>>,
    /// Priority group, if applicable.
    pub priority: Option<SuspendPriority>,
    /// Phase, if applicable.
    pub phase: Option<Phase>,
    /// Human-readable reason (errors, panic info).
    pub reason: Option<Arc<str>>,
    /// Suspend timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            activity: None,
            priority: None,
            phase: None,
            reason: None,
            timeout_ms: None,
        }
    }

    /// Attaches an activity name.
    #[inline]
    pub fn with_activity(mut self, activity: impl Into<Arc<str>>) -> Self {
        self.activity = Some(activity.into());
        self
    }

    /// Attaches a priority group.
    #[inline]
    pub fn with_priority(mut self, priority: SuspendPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attaches a phase.
    #[inline]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a timeout (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::SuspendRequested);
        let b = Event::new(EventKind::SuspendCompleted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_timeout_saturates() {
        let ev = Event::new(EventKind::SuspendTimedOut).with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ev.timeout_ms, Some(u32::MAX));
        let ev = Event::new(EventKind::SuspendTimedOut).with_timeout(Duration::from_millis(50));
        assert_eq!(ev.timeout_ms, Some(50));
    }
}
