//! Controller core: lifecycle state, drain orchestration and shutdown.
//!
//! The public API from this module is [`SuspendController`] (built through
//! [`SuspendControllerBuilder`]) together with its configuration, state and
//! completion types.
//!
//! Internal modules:
//! - [`controller`]: state machine, registry, listeners and advisory timer;
//! - [`drain`]: phase passes over priority groups;
//! - [`serial`]: FIFO queue serializing activity and listener calls;
//! - [`timer`]: cancellable advisory timeout;
//! - [`completion`]: awaitable suspend/resume results;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod completion;
mod config;
mod controller;
mod drain;
mod serial;
mod shutdown;
mod state;
mod timer;


pub use builder::SuspendControllerBuilder;
pub use completion::{ResumeCompletion, SuspendCompletion, SuspendOutcome};
pub use config::SuspendConfig;
pub use controller::SuspendController;
pub use drain::Phase;
pub use shutdown::{suspend_on_signal, wait_for_shutdown_signal};
pub use state::{SuspendState, SuspensionStateProvider};
