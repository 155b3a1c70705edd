//! # Activity contracts.
//!
//! Subsystems that own in-flight work participate in suspend/resume through one of
//! two contracts:
//! - [`ServerActivity`] - callback-style (`pre_suspend`/`suspended`/`resume`), each
//!   phase acknowledged through a [`ServerActivityCallback`];
//! - [`SuspendableActivity`] - stage-based (`prepare`/`suspend`/`resume`), each phase
//!   returning an [`ActivityStage`].
//!
//! Both are registered as an [`Activity`] at a [`SuspendPriority`].

mod callback;
mod context;
mod handle;
mod priority;
mod server_activity;
mod suspendable;

pub(crate) use callback::Countdown;
pub(crate) use handle::ActivityId;

pub use callback::ServerActivityCallback;
pub use context::{ServerResumeContext, ServerSuspendContext};
pub use handle::Activity;
pub use priority::SuspendPriority;
pub use server_activity::ServerActivity;
pub use suspendable::{ActivityStage, SuspendableActivity, completed};
