//! # Registration façade.
//!
//! Two ways to participate:
//! - [`SuspendableActivityRegistry`]: explicit `register_activity` / `unregister_activity`;
//! - [`SuspendableActivityRegistrar`]: `register` returns a [`Registration`] guard that
//!   unregisters when closed or dropped (scoped services).
//!
//! Registration and unregistration are unconditional and idempotent.

use std::sync::Weak;

use crate::activity::{Activity, SuspendPriority};
use crate::core::SuspensionStateProvider;

/// Add/remove activities at a priority.
pub trait SuspendableActivityRegistry: SuspensionStateProvider + Send + Sync {
    /// Registers `activity` at `priority`.
    ///
    /// Registering an already-registered activity keeps its original priority.
    fn register_activity(&self, activity: Activity, priority: SuspendPriority);

    /// Registers `activity` at [`SuspendPriority::DEFAULT`].
    fn register_activity_default(&self, activity: Activity) {
        self.register_activity(activity, SuspendPriority::DEFAULT);
    }

    /// Unregisters `activity`; unknown activities are ignored.
    fn unregister_activity(&self, activity: &Activity);
}

/// Registration returning a closable guard.
pub trait SuspendableActivityRegistrar {
    /// Registers `activity` at `priority` and returns its guard.
    fn register(&self, activity: Activity, priority: SuspendPriority) -> Registration;
}

/// Guard that unregisters its activity on [`close`](Self::close) or drop.
#[must_use = "dropping a Registration unregisters the activity"]
pub struct Registration {
    registry: Weak<dyn SuspendableActivityRegistry>,
    activity: Option<Activity>,
}

impl Registration {
    pub(crate) fn new(registry: Weak<dyn SuspendableActivityRegistry>, activity: Activity) -> Self {
        Self {
            registry,
            activity: Some(activity),
        }
    }

    /// The registered activity.
    pub fn activity(&self) -> Option<&Activity> {
        self.activity.as_ref()
    }

    /// Unregisters the activity now.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(activity) = self.activity.take() {
            if let Some(registry) = self.registry.upgrade() {
                registry.unregister_activity(&activity);
            }
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("activity", &self.activity)
            .finish()
    }
}
