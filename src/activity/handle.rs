//! # Registered activity handle.
//!
//! [`Activity`] wraps either activity generation so the registry and the drain only
//! deal with one type. Identity is the address of the shared activity, so two
//! handles built from clones of the same `Arc` are the same activity.

use std::fmt;
use std::sync::Arc;

use super::server_activity::ServerActivity;
use super::suspendable::SuspendableActivity;

/// Identity of a registered activity (address of the shared value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ActivityId(usize);

/// Shared handle to a callback-style or stage-based activity.
#[derive(Clone)]
pub enum Activity {
    /// Callback-style activity.
    Legacy(Arc<dyn ServerActivity>),
    /// Stage-based activity.
    Suspendable(Arc<dyn SuspendableActivity>),
}

impl Activity {
    /// Wraps a callback-style activity.
    pub fn legacy(activity: Arc<dyn ServerActivity>) -> Self {
        Activity::Legacy(activity)
    }

    /// Wraps a stage-based activity.
    pub fn suspendable(activity: Arc<dyn SuspendableActivity>) -> Self {
        Activity::Suspendable(activity)
    }

    /// Activity name as reported by the activity.
    pub fn name(&self) -> &str {
        match self {
            Activity::Legacy(a) => a.name(),
            Activity::Suspendable(a) => a.name(),
        }
    }

    pub(crate) fn id(&self) -> ActivityId {
        let ptr = match self {
            Activity::Legacy(a) => Arc::as_ptr(a) as *const () as usize,
            Activity::Suspendable(a) => Arc::as_ptr(a) as *const () as usize,
        };
        ActivityId(ptr)
    }

    pub(crate) fn label(&self) -> Arc<str> {
        Arc::from(self.name())
    }
}

impl fmt::Debug for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Activity::Legacy(_) => "legacy",
            Activity::Suspendable(_) => "suspendable",
        };
        f.debug_struct("Activity")
            .field("name", &self.name())
            .field("kind", &kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ServerActivityCallback, ServerResumeContext, ServerSuspendContext};
    use crate::activity::{ActivityStage, completed};

    struct Listener;

    impl ServerActivity for Listener {
        fn pre_suspend(&self, cb: ServerActivityCallback) {
            cb.done();
        }
        fn suspended(&self, cb: ServerActivityCallback) {
            cb.done();
        }
        fn resume(&self) {}
        fn name(&self) -> &str {
            "listener"
        }
    }

    struct Deployments;

    impl SuspendableActivity for Deployments {
        fn suspend(&self, _ctx: &ServerSuspendContext) -> ActivityStage {
            completed()
        }
        fn resume(&self, _ctx: &ServerResumeContext) -> ActivityStage {
            completed()
        }
    }

    #[test]
    fn test_identity_follows_the_shared_value() {
        let l = Arc::new(Listener);
        let a = Activity::legacy(l.clone());
        let b = Activity::legacy(l);
        let c = Activity::legacy(Arc::new(Listener));
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_name_defaults_to_type_name() {
        let d = Activity::suspendable(Arc::new(Deployments));
        assert!(d.name().ends_with("Deployments"));
        assert_eq!(Activity::legacy(Arc::new(Listener)).name(), "listener");
    }
}
