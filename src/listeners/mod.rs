//! Lifecycle listeners notified synchronously on suspend transitions.

mod listener;
mod set;

pub(crate) use set::ListenerSet;

pub use listener::OperationListener;
