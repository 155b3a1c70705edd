//! Error types used by the suspend controller and its activities.
//!
//! This module defines three error enums:
//!
//! - [`RuntimeError`]: errors raised by the controller itself (construction, shutdown).
//! - [`ActivityError`]: failures reported by (or synthesized for) a single activity.
//! - [`PriorityError`]: an invalid [`SuspendPriority`](crate::SuspendPriority) ordinal.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the suspend controller.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A graceful suspend did not finish within its grace period.
    ///
    /// The controller is left in whatever state the drain reached; the caller decides
    /// whether to proceed with a hard stop.
    #[error("suspend did not complete within {grace:?}; pending: {pending:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of activities that had not finished their current phase.
        pending: Vec<String>,
    },

    /// The suspend was cancelled by a `resume()` before it completed.
    #[error("suspend cancelled by resume")]
    SuspendCancelled,

    /// No tokio runtime was available to drive timers and pending activity stages.
    #[error("no tokio runtime available; build the controller inside a runtime or pass a handle")]
    NoRuntime,

    /// OS signal handlers could not be installed.
    #[error("failed to install signal handlers: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use suspendvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), pending: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::SuspendCancelled => "runtime_suspend_cancelled",
            RuntimeError::NoRuntime => "runtime_missing",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, pending } => {
                format!("grace exceeded after {grace:?}; pending activities={pending:?}")
            }
            RuntimeError::SuspendCancelled => "suspend cancelled".to_string(),
            RuntimeError::NoRuntime => "no tokio runtime".to_string(),
            RuntimeError::Signal(e) => format!("signal setup: {e}"),
        }
    }
}

/// # Errors produced by an activity while it handles a phase.
///
/// Stage-based activities return these from their completion stages. The controller
/// also synthesizes [`ActivityError::Panicked`] when an activity panics.
/// Either way the failure is logged and the activity counts as done for that phase.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivityError {
    /// The activity could not complete the phase.
    #[error("activity failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The activity panicked while handling the phase.
    #[error("activity panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl ActivityError {
    /// Convenience constructor for [`ActivityError::Failed`].
    pub fn failed(error: impl Into<String>) -> Self {
        ActivityError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use suspendvisor::ActivityError;
    ///
    /// let err = ActivityError::failed("listener still bound");
    /// assert_eq!(err.as_label(), "activity_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ActivityError::Failed { .. } => "activity_failed",
            ActivityError::Panicked { .. } => "activity_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ActivityError::Failed { error } => format!("error: {error}"),
            ActivityError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// # Invalid priority ordinal.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityError {
    /// Ordinal outside `0..=10`.
    #[error("suspend priority {value} out of range 0..=10")]
    OutOfRange {
        /// The rejected ordinal.
        value: u8,
    },
}

impl PriorityError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PriorityError::OutOfRange { .. } => "priority_out_of_range",
        }
    }
}

/// Renders a caught panic payload.
pub(crate) fn panic_info(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(RuntimeError::NoRuntime.as_label(), "runtime_missing");
        assert_eq!(
            RuntimeError::SuspendCancelled.as_label(),
            "runtime_suspend_cancelled"
        );
        assert_eq!(
            ActivityError::Panicked { info: "x".into() }.as_label(),
            "activity_panicked"
        );
        assert_eq!(
            PriorityError::OutOfRange { value: 11 }.as_label(),
            "priority_out_of_range"
        );
    }

    #[test]
    fn test_grace_exceeded_message_lists_pending() {
        let err = RuntimeError::GraceExceeded {
            grace: Duration::from_millis(250),
            pending: vec!["http-listener".into()],
        };
        assert!(err.as_message().contains("http-listener"));
        assert!(err.to_string().contains("250ms"));
    }

    #[test]
    fn test_panic_info_handles_both_string_kinds() {
        let a: Box<dyn std::any::Any + Send> = Box::new("static");
        let b: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let c: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_info(a.as_ref()), "static");
        assert_eq!(panic_info(b.as_ref()), "owned");
        assert_eq!(panic_info(c.as_ref()), "non-string panic payload");
    }
}
