//! # Callback-style activity.
//!
//! [`ServerActivity`] is the original participation contract: the controller hands the
//! activity a [`ServerActivityCallback`] per phase and waits for `done()`.
//!
//! ```text
//! suspend(): pre_suspend(cb) on every activity ─► all done ─► suspended(cb) on every activity
//! resume():  resume() on every activity (no callback)
//! ```
//!
//! An activity that never calls `done()` stalls the drain. The suspend timeout is only
//! advisory, so nothing forces such a drain to finish.

use super::callback::ServerActivityCallback;

/// Callback-style participant in suspend/resume.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use suspendvisor::{ServerActivity, ServerActivityCallback};
///
/// struct Gate { open: AtomicBool }
///
/// impl ServerActivity for Gate {
///     fn name(&self) -> &str { "gate" }
///     fn pre_suspend(&self, cb: ServerActivityCallback) {
///         self.open.store(false, Ordering::SeqCst);
///         cb.done();
///     }
///     fn suspended(&self, cb: ServerActivityCallback) { cb.done(); }
///     fn resume(&self) { self.open.store(true, Ordering::SeqCst); }
/// }
/// ```
pub trait ServerActivity: Send + Sync + 'static {
    /// Stops accepting new work. Call `cb.done()` once that is in effect.
    fn pre_suspend(&self, cb: ServerActivityCallback);

    /// Waits for in-flight work to drain. Call `cb.done()` once it has.
    fn suspended(&self, cb: ServerActivityCallback);

    /// Starts accepting work again.
    ///
    /// May be called while a drain is still in progress (suspend cancelled).
    fn resume(&self);

    /// Returns the activity name used in logs, events and diagnostics.
    ///
    /// The default uses `type_name::<Self>()`; override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
