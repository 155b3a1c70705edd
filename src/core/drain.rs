//! # Phase passes over the priority groups.
//!
//! A [`PhasePass`] runs one phase across the priority groups, group after group:
//!
//! ```text
//! PhasePass { phase, groups = [(0,[a,d]), (5,[b]), (10,[c])] }
//!
//! step(0): Countdown(2) ─► invoke(a), invoke(d) ─► both done ─► step(1)
//! step(1): Countdown(1) ─► invoke(b)            ─► done      ─► step(2)
//! step(2): Countdown(1) ─► invoke(c)            ─► done      ─► step(3)
//! step(3): no group left ─► Then
//! ```
//!
//! Each step runs as a job on the controller's serial queue: the continuation of a
//! group's countdown submits the next step rather than calling it.
//!
//! Suspend runs a `Prepare` pass (ascending), then a `Suspend` pass (ascending).
//! Resume runs a single `Resume` pass (descending).
//!
//! ## Rules
//! - Every pass is gated by the epoch it was started in. The epoch is checked before
//!   each activity call, so once a newer `suspend()` or `resume()` supersedes a pass
//!   no further activity is invoked and late completions are ignored.
//! - A superseded resume pass drops its completion sender; its [`ResumeCompletion`]
//!   resolves without waiting for the remaining groups.
//! - Steps run on whichever thread drains the queue (activity thread, runtime worker
//!   or the caller of `suspend()`), never under the controller lock.
//!
//! [`ResumeCompletion`]: super::ResumeCompletion

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use futures::FutureExt;
use tokio::sync::oneshot;

use super::controller::SuspendController;
use crate::activity::{
    Activity, ActivityStage, Countdown, ServerActivityCallback, ServerResumeContext,
    ServerSuspendContext, SuspendPriority,
};
use crate::error::{ActivityError, panic_info};
use crate::events::{Event, EventKind};

/// Phase of a suspend or resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// `pre_suspend` / `prepare`: stop accepting new work.
    Prepare,
    /// `suspended` / `suspend`: drain in-flight work.
    Suspend,
    /// `resume`: accept work again.
    Resume,
}

impl Phase {
    /// Short stable label for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Prepare => "prepare",
            Phase::Suspend => "suspend",
            Phase::Resume => "resume",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens after the last group of a pass.
pub(crate) enum Then {
    /// Prepare finished: move to `Suspending` and start the suspend pass.
    EnterSuspending,
    /// Suspend finished: move to `Suspended`.
    Suspended,
    /// Resume finished.
    Resumed(oneshot::Sender<()>),
}

pub(crate) struct PhasePass {
    controller: Weak<SuspendController>,
    epoch: u64,
    phase: Phase,
    groups: Vec<(SuspendPriority, Vec<Activity>)>,
    suspend_ctx: ServerSuspendContext,
    resume_ctx: ServerResumeContext,
    then: Mutex<Option<Then>>,
}

impl PhasePass {
    pub(crate) fn suspend(
        controller: Weak<SuspendController>,
        epoch: u64,
        phase: Phase,
        groups: Vec<(SuspendPriority, Vec<Activity>)>,
        ctx: ServerSuspendContext,
        then: Then,
    ) -> Arc<Self> {
        Arc::new(Self {
            controller,
            epoch,
            phase,
            groups,
            suspend_ctx: ctx,
            resume_ctx: ServerResumeContext::runtime(),
            then: Mutex::new(Some(then)),
        })
    }

    pub(crate) fn resume(
        controller: Weak<SuspendController>,
        epoch: u64,
        groups: Vec<(SuspendPriority, Vec<Activity>)>,
        ctx: ServerResumeContext,
        done: oneshot::Sender<()>,
    ) -> Arc<Self> {
        Arc::new(Self {
            controller,
            epoch,
            phase: Phase::Resume,
            groups,
            suspend_ctx: ServerSuspendContext::runtime(),
            resume_ctx: ctx,
            then: Mutex::new(Some(Then::Resumed(done))),
        })
    }

    pub(crate) fn start(self: Arc<Self>) {
        self.step(0);
    }

    fn step(self: Arc<Self>, index: usize) {
        let Some(ctl) = self.controller.upgrade() else {
            return;
        };
        if !self.current(&ctl) {
            return;
        }

        let Some((priority, group)) = self.groups.get(index) else {
            self.finish(&ctl);
            return;
        };

        let next = Arc::clone(&self);
        let countdown = Countdown::new(group.iter().map(Activity::label).collect(), move || {
            next.advance(index + 1)
        });
        ctl.track(self.epoch, &countdown);

        tracing::debug!(
            phase = %self.phase,
            priority = priority.value(),
            activities = group.len(),
            "phase group started"
        );
        ctl.publish(
            Event::new(EventKind::PhaseStarted)
                .with_phase(self.phase)
                .with_priority(*priority),
        );

        for (slot, activity) in group.iter().enumerate() {
            if !self.current(&ctl) {
                return;
            }
            self.invoke(&ctl, activity, countdown.callback(slot));
        }
    }

    fn current(&self, ctl: &SuspendController) -> bool {
        let current = ctl.is_current(self.epoch);
        if !current {
            tracing::debug!(epoch = self.epoch, phase = %self.phase, "stale phase pass stopped");
        }
        current
    }

    /// Countdown continuation: queues the next step.
    fn advance(self: Arc<Self>, index: usize) {
        if let Some(ctl) = self.controller.upgrade() {
            ctl.submit(move |_| self.step(index));
        }
    }

    fn finish(&self, ctl: &Arc<SuspendController>) {
        let then = self
            .then
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match then {
            Some(Then::EnterSuspending) => {
                if ctl.enter_suspending(self.epoch) {
                    PhasePass::suspend(
                        self.controller.clone(),
                        self.epoch,
                        Phase::Suspend,
                        self.groups.clone(),
                        self.suspend_ctx,
                        Then::Suspended,
                    )
                    .start();
                }
            }
            Some(Then::Suspended) => ctl.finish_suspend(self.epoch),
            Some(Then::Resumed(done)) => ctl.finish_resume(self.epoch, done),
            None => {}
        }
    }

    /// Invokes `activity` for this pass's phase; every outcome ends in `cb.done()`.
    fn invoke(&self, ctl: &SuspendController, activity: &Activity, cb: ServerActivityCallback) {
        match activity {
            Activity::Legacy(a) => {
                let res = catch_unwind(AssertUnwindSafe(|| match self.phase {
                    Phase::Prepare => a.pre_suspend(cb.clone()),
                    Phase::Suspend => a.suspended(cb.clone()),
                    Phase::Resume => {
                        a.resume();
                        cb.done();
                    }
                }));
                if let Err(panic) = res {
                    let err = ActivityError::Panicked {
                        info: panic_info(panic.as_ref()),
                    };
                    ctl.activity_failed(activity, self.phase, &err);
                    if !cb.is_done() {
                        cb.done();
                    }
                }
            }
            Activity::Suspendable(a) => {
                let stage = catch_unwind(AssertUnwindSafe(|| match self.phase {
                    Phase::Prepare => a.prepare(&self.suspend_ctx),
                    Phase::Suspend => a.suspend(&self.suspend_ctx),
                    Phase::Resume => a.resume(&self.resume_ctx),
                }));
                match stage {
                    Ok(stage) => drive(ctl, activity.clone(), self.phase, stage, cb),
                    Err(panic) => {
                        let err = ActivityError::Panicked {
                            info: panic_info(panic.as_ref()),
                        };
                        ctl.activity_failed(activity, self.phase, &err);
                        cb.done();
                    }
                }
            }
        }
    }
}

/// Drives a completion stage and reports into `cb`.
///
/// An already-complete stage is consumed inline; a pending one runs on the
/// controller's runtime.
pub(crate) fn drive(
    ctl: &SuspendController,
    activity: Activity,
    phase: Phase,
    mut stage: ActivityStage,
    cb: ServerActivityCallback,
) {
    let polled = catch_unwind(AssertUnwindSafe(|| (&mut stage).now_or_never()));
    match polled {
        Ok(Some(result)) => {
            ctl.stage_finished(&activity, phase, result);
            cb.done();
        }
        Ok(None) => {
            let weak = ctl.weak();
            ctl.runtime().spawn(async move {
                let result = AssertUnwindSafe(stage)
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        Err(ActivityError::Panicked {
                            info: panic_info(panic.as_ref()),
                        })
                    });
                if let Some(ctl) = weak.upgrade() {
                    ctl.stage_finished(&activity, phase, result);
                }
                cb.done();
            });
        }
        Err(panic) => {
            let err = ActivityError::Panicked {
                info: panic_info(panic.as_ref()),
            };
            ctl.activity_failed(&activity, phase, &err);
            cb.done();
        }
    }
}
