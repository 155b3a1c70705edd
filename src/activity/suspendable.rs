//! # Stage-based activity.
//!
//! [`SuspendableActivity`] returns a completion stage for every phase instead of
//! taking a callback. The controller composes the stages per priority group.
//!
//! A stage that is already complete when returned is consumed inline; a pending stage
//! is driven on the controller's runtime and reports back when it resolves.

use futures::future::{self, BoxFuture, FutureExt};

use super::context::{ServerResumeContext, ServerSuspendContext};
use crate::error::ActivityError;

/// Completion stage returned by [`SuspendableActivity`] phases.
///
/// The stage must be `'static`: clone what it needs out of `self`.
pub type ActivityStage = BoxFuture<'static, Result<(), ActivityError>>;

/// Returns an already-completed stage.
pub fn completed() -> ActivityStage {
    future::ready(Ok(())).boxed()
}

/// Stage-based participant in suspend/resume.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tokio::sync::Notify;
/// use futures::FutureExt;
/// use suspendvisor::{
///     ActivityStage, ServerResumeContext, ServerSuspendContext, SuspendableActivity, completed,
/// };
///
/// struct Requests { drained: Arc<Notify> }
///
/// impl SuspendableActivity for Requests {
///     fn name(&self) -> &str { "requests" }
///
///     fn suspend(&self, ctx: &ServerSuspendContext) -> ActivityStage {
///         if ctx.is_starting() {
///             return completed();
///         }
///         let drained = Arc::clone(&self.drained);
///         async move {
///             drained.notified().await;
///             Ok(())
///         }
///         .boxed()
///     }
///
///     fn resume(&self, _ctx: &ServerResumeContext) -> ActivityStage {
///         completed()
///     }
/// }
/// ```
pub trait SuspendableActivity: Send + Sync + 'static {
    /// Prepares for suspension (e.g. stop accepting new work).
    ///
    /// Default: already completed.
    fn prepare(&self, ctx: &ServerSuspendContext) -> ActivityStage {
        let _ = ctx;
        completed()
    }

    /// Suspends: the stage completes once in-flight work has drained.
    fn suspend(&self, ctx: &ServerSuspendContext) -> ActivityStage;

    /// Resumes normal operation.
    ///
    /// May be called while a `suspend` stage is still pending (suspend cancelled).
    fn resume(&self, ctx: &ServerResumeContext) -> ActivityStage;

    /// Returns the activity name used in logs, events and diagnostics.
    ///
    /// The default uses `type_name::<Self>()`; override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
