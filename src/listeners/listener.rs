//! # Suspend lifecycle listener.
//!
//! [`OperationListener`] is the synchronous observer contract used by callers that
//! wait for a suspend to finish (e.g. a management operation that must reply).
//!
//! ```text
//! suspend() ─► suspend_started()
//!                ├─► complete()    all activities drained
//!                ├─► timeout()     advisory deadline passed (drain continues)
//!                └─► cancelled()   resume() before (or after) completion
//! ```
//!
//! ## Rules
//! - Callbacks run on the thread that caused the transition; keep them short.
//! - Callbacks never run under the controller lock, so they may call back into the
//!   controller (including adding/removing listeners).
//! - A panicking listener is logged and does not affect the others.

/// Observer of suspend lifecycle transitions. All methods default to no-ops.
pub trait OperationListener: Send + Sync + 'static {
    /// A suspend has started (state moved to `PreSuspend`).
    fn suspend_started(&self) {}

    /// Every activity finished; the controller is `Suspended`.
    fn complete(&self) {}

    /// `resume()` was called.
    fn cancelled(&self) {}

    /// The suspend timeout elapsed before the drain finished.
    fn timeout(&self) {}
}
