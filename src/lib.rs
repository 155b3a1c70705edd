//! # suspendvisor
//!
//! **Suspendvisor** coordinates graceful suspend/resume of a server's subsystems.
//!
//! Subsystems that own in-flight work (listeners, request handlers, deployment
//! machinery) register an *activity* at a *priority*. On suspend the controller
//! tells every activity to stop accepting new work, waits for all of them, then tells
//! every activity to drain, waits again, and only then reports the server suspended.
//! Resume reverses the order.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!   │  Activity    │   │  Activity    │   │  Activity    │
//!   │ (priority 0) │   │ (priority 5) │   │ (priority 10)│
//!   └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!          ▼ register         ▼ register         ▼ register
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  SuspendController                                                │
//! │  - PriorityBuckets (activities grouped by priority)               │
//! │  - SuspendState (RUNNING / PRE_SUSPEND / SUSPENDING / SUSPENDED)  │
//! │  - ListenerSet (OperationListener callbacks)                      │
//! │  - SuspendTimer (advisory timeout)                                │
//! └──────┬─────────────────────────────────────────────────┬──────────┘
//!        │ phase passes                                    │ publish(Event)
//!        ▼                                                 ▼
//!   Prepare ─► Suspend (ascending)          ┌──────────────────────────────┐
//!   Resume (descending)                     │  Bus (broadcast channel)     │
//!                                           └──────────────┬───────────────┘
//!                                                          ▼
//!                                              ┌────────────────────────┐
//!                                              │  subscriber_listener   │
//!                                              └───────────┬────────────┘
//!                                                          ▼
//!                                                    SubscriberSet
//!                                                  ┌────────┼────────┐
//!                                                  ▼        ▼        ▼
//!                                               worker1  worker2  workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! build() ─► SUSPENDED ─► boot_complete() ─► resume ─► RUNNING
//!
//! suspend(timeout)
//!   ├─► PRE_SUSPEND: for each group (0..=10): pre_suspend/prepare, wait for all
//!   ├─► SUSPENDING:  for each group (0..=10): suspended/suspend, wait for all
//!   └─► SUSPENDED:   listeners.complete()
//!
//! resume()
//!   └─► RUNNING: listeners.cancelled(); for each group (10..=0): resume
//! ```
//!
//! ## Features
//! | Area              | Description                                                        | Key types / traits                              |
//! |-------------------|--------------------------------------------------------------------|-------------------------------------------------|
//! | **Controller**    | State machine, drain orchestration, advisory timeout.              | [`SuspendController`], [`SuspendConfig`]        |
//! | **Activities**    | Callback-style and stage-based participation contracts.            | [`ServerActivity`], [`SuspendableActivity`]     |
//! | **Registry**      | Register at a priority; scoped registration guards.                | [`SuspendableActivityRegistry`], [`Registration`] |
//! | **Listeners**     | Synchronous suspend lifecycle callbacks.                           | [`OperationListener`]                           |
//! | **Subscriber API**| Asynchronous event stream (logging, metrics, audit).               | [`Subscribe`], [`Event`]                        |
//! | **Errors**        | Typed errors for the controller and activities.                    | [`RuntimeError`], [`ActivityError`]             |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use suspendvisor::{
//!     Activity, ServerActivity, ServerActivityCallback, SuspendConfig, SuspendController,
//!     SuspendPriority, SuspendState, SuspendableActivityRegistry,
//! };
//!
//! struct Listener;
//!
//! impl ServerActivity for Listener {
//!     fn name(&self) -> &str { "http-listener" }
//!     fn pre_suspend(&self, cb: ServerActivityCallback) { cb.done(); }
//!     fn suspended(&self, cb: ServerActivityCallback) { cb.done(); }
//!     fn resume(&self) {}
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn suspendvisor::Subscribe>> = {
//!         use suspendvisor::LogWriter;
//!         vec![Arc::new(LogWriter::default())]
//!     };
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn suspendvisor::Subscribe>> = Vec::new();
//!
//!     let ctl = SuspendController::builder(SuspendConfig::default())
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     ctl.register_activity(Activity::legacy(Arc::new(Listener)), SuspendPriority::DEFAULT);
//!     ctl.boot_complete();
//!     assert_eq!(ctl.state(), SuspendState::Running);
//!
//!     ctl.suspend(Duration::from_secs(5)).await;
//!     assert_eq!(ctl.state(), SuspendState::Suspended);
//!
//!     ctl.resume().await;
//!     Ok(())
//! }
//! ```
mod activity;
mod core;
mod error;
mod events;
mod listeners;
mod registry;
mod subscribers;

// ---- Public re-exports ----

pub use activity::{
    Activity, ActivityStage, ServerActivity, ServerActivityCallback, ServerResumeContext,
    ServerSuspendContext, SuspendPriority, SuspendableActivity, completed,
};
pub use core::{
    Phase, ResumeCompletion, SuspendCompletion, SuspendConfig, SuspendController,
    SuspendControllerBuilder, SuspendOutcome, SuspendState, SuspensionStateProvider,
    suspend_on_signal, wait_for_shutdown_signal,
};
pub use error::{ActivityError, PriorityError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use listeners::OperationListener;
pub use registry::{Registration, SuspendableActivityRegistrar, SuspendableActivityRegistry};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
