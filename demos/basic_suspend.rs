//! # Example: basic_suspend
//!
//! Minimal suspend/resume cycle with one callback-style and one stage-based activity.
//!
//! Demonstrates how to:
//! - Implement [`ServerActivity`] and [`SuspendableActivity`].
//! - Register them at different priorities on a [`SuspendController`].
//! - Suspend with an advisory timeout, then resume.
//!
//! ## Flow
//! ```text
//! build() ─► SUSPENDED ─► boot_complete() ─► RUNNING
//!
//! suspend(5s)
//!   ├─► Prepare: listener.pre_suspend ─► jobs.prepare
//!   ├─► Suspend: listener.suspended   ─► jobs.suspend (waits for in-flight work)
//!   └─► SUSPENDED
//!
//! resume()
//!   └─► jobs.resume ─► listener.resume ─► RUNNING
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_suspend
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use suspendvisor::{
    Activity, ActivityStage, ServerActivity, ServerActivityCallback, ServerResumeContext,
    ServerSuspendContext, SuspendConfig, SuspendController, SuspendOutcome, SuspendPriority,
    SuspendableActivity, SuspendableActivityRegistry, completed,
};

/// Stops accepting connections; nothing to drain.
struct HttpListener;

impl ServerActivity for HttpListener {
    fn name(&self) -> &str {
        "http-listener"
    }

    fn pre_suspend(&self, cb: ServerActivityCallback) {
        println!("[http] no longer accepting connections");
        cb.done();
    }

    fn suspended(&self, cb: ServerActivityCallback) {
        cb.done();
    }

    fn resume(&self) {
        println!("[http] accepting connections again");
    }
}

/// Finishes its in-flight job before reporting suspended.
struct JobRunner;

impl SuspendableActivity for JobRunner {
    fn name(&self) -> &str {
        "job-runner"
    }

    fn prepare(&self, _ctx: &ServerSuspendContext) -> ActivityStage {
        println!("[jobs] rejecting new jobs");
        completed()
    }

    fn suspend(&self, ctx: &ServerSuspendContext) -> ActivityStage {
        let stopping = ctx.is_stopping();
        async move {
            println!("[jobs] draining in-flight job (stopping={stopping})");
            tokio::time::sleep(Duration::from_millis(300)).await;
            println!("[jobs] drained");
            Ok(())
        }
        .boxed()
    }

    fn resume(&self, _ctx: &ServerResumeContext) -> ActivityStage {
        println!("[jobs] accepting jobs again");
        completed()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Build the controller (starts SUSPENDED)
    let ctl = SuspendController::builder(SuspendConfig::default()).build()?;

    // 2. Register activities: the listener stops first, jobs drain after it
    ctl.register_activity(Activity::legacy(Arc::new(HttpListener)), SuspendPriority::FIRST);
    ctl.register_activity_default(Activity::suspendable(Arc::new(JobRunner)));

    // 3. Finish boot; every activity is resumed once
    ctl.boot_complete();
    println!("state: {}", ctl.state());

    // 4. Suspend with an advisory timeout and wait for the drain
    let outcome = ctl.suspend(Duration::from_secs(5)).await;
    println!("suspend outcome: {outcome:?}, state: {}", ctl.state());
    assert_eq!(outcome, SuspendOutcome::Suspended);

    // 5. Resume (highest priority group first)
    ctl.resume().await;
    println!("state: {}", ctl.state());
    Ok(())
}
