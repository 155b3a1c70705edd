use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;

use super::{config::SuspendConfig, controller::SuspendController};
use crate::{
    error::RuntimeError,
    events::Bus,
    listeners::{ListenerSet, OperationListener},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`SuspendController`] with optional features.
pub struct SuspendControllerBuilder {
    cfg: SuspendConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    listeners: Vec<Arc<dyn OperationListener>>,
    runtime: Option<Handle>,
}

impl SuspendControllerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SuspendConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            listeners: Vec::new(),
            runtime: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive controller events (suspend cycle, resume, activity failures)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the initial lifecycle listeners.
    pub fn with_listeners(mut self, listeners: Vec<Arc<dyn OperationListener>>) -> Self {
        self.listeners = listeners;
        self
    }

    /// Runtime that drives timers, pending activity stages and subscriber workers.
    ///
    /// Defaults to the runtime `build()` is called from.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds and returns the controller, in the `Suspended` state.
    ///
    /// This consumes the builder and initializes:
    /// - Event bus for broadcasting
    /// - Listener set
    /// - Subscriber workers (if any) and the bus forwarder
    ///
    /// Fails with [`RuntimeError::NoRuntime`] if no runtime handle was given and
    /// `build()` is not called from within a tokio runtime.
    pub fn build(self) -> Result<Arc<SuspendController>, RuntimeError> {
        let runtime = match self.runtime {
            Some(h) => h,
            None => Handle::try_current().map_err(|_| RuntimeError::NoRuntime)?,
        };
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, &runtime);
            subscriber_listener(&runtime, &bus, subs);
        }

        Ok(SuspendController::new(
            self.cfg,
            ListenerSet::new(self.listeners),
            bus,
            runtime,
        ))
    }
}

/// Forwards bus events to the subscriber set until the controller is dropped.
fn subscriber_listener(runtime: &Handle, bus: &Bus, set: SubscriberSet) {
    let mut rx = bus.subscribe();
    runtime.spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber forwarder lagged; events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SuspendState;

    #[test]
    fn test_build_outside_runtime_fails() {
        let err = SuspendController::builder(SuspendConfig::default())
            .build()
            .err()
            .expect("no runtime");
        assert!(matches!(err, RuntimeError::NoRuntime));
    }

    #[test]
    fn test_build_with_explicit_handle() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let ctl = SuspendController::builder(SuspendConfig::default())
            .with_runtime(rt.handle().clone())
            .build()
            .expect("handle given");
        assert_eq!(ctl.state(), SuspendState::Suspended);
    }
}
