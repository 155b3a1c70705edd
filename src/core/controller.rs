//! # SuspendController: drains registered activities before suspension.
//!
//! The [`SuspendController`] owns the activity registry, the lifecycle state, the
//! advisory timer and the listener set. It drives the two-phase drain:
//!
//! ```text
//! suspend(timeout)
//!   ├─► state = PRE_SUSPEND, listeners.suspend_started()
//!   ├─► (timeout > 0) start advisory timer ─────────────► listeners.timeout()
//!   ├─► no activities? ─► SUSPENDED, listeners.complete()
//!   └─► Prepare pass (groups ascending: pre_suspend / prepare)
//!          └─► all done ─► state = SUSPENDING
//!                └─► Suspend pass (groups ascending: suspended / suspend)
//!                       └─► all done ─► cancel timer, SUSPENDED, listeners.complete()
//!
//! resume()
//!   ├─► state = RUNNING, cancel timer, listeners.cancelled()
//!   └─► Resume pass (groups descending: resume)
//! ```
//!
//! ## Rules
//! - One lock guards state, registry, epoch, timer and waiters; it is never held
//!   while activities or listeners run.
//! - Calls into activities and listeners are queued on a [`SerialQueue`] while the
//!   lock is held, so they run one at a time and in transition order. A `resume()`
//!   issued from inside an activity callback runs after that callback returns.
//! - `suspend()` and `resume()` return immediately; completion is observed through
//!   listeners, events or the returned completion futures.
//! - The timeout is advisory: it never changes state or aborts the drain.
//! - Activity failures (panics, failed stages) are logged and count as done.
//! - An activity registered while not `RUNNING` is suspended immediately with a
//!   no-op callback; it is not part of any drain in progress.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};

use super::builder::SuspendControllerBuilder;
use super::completion::{ResumeCompletion, SuspendCompletion, SuspendOutcome};
use super::config::SuspendConfig;
use super::drain::{self, Phase, PhasePass, Then};
use super::serial::SerialQueue;
use super::state::{SuspendState, SuspensionStateProvider};
use super::timer::SuspendTimer;
use crate::activity::{
    Activity, Countdown, ServerActivityCallback, ServerResumeContext, ServerSuspendContext,
    SuspendPriority,
};
use crate::error::{ActivityError, RuntimeError, panic_info};
use crate::events::{Bus, Event, EventKind};
use crate::listeners::{ListenerSet, OperationListener};
use crate::registry::{
    PriorityBuckets, Registration, SuspendableActivityRegistrar, SuspendableActivityRegistry,
};

/// State guarded by the controller lock.
struct Inner {
    state: SuspendState,
    registry: PriorityBuckets,
    /// Bumped by every suspend and resume; identifies the current drain.
    epoch: u64,
    timer: Option<SuspendTimer>,
    waiters: Vec<oneshot::Sender<SuspendOutcome>>,
    /// Countdown of the group currently draining (diagnostics).
    group: Option<Arc<Countdown>>,
}

/// Coordinates graceful suspend/resume across registered activities.
///
/// Constructed once per server via [`SuspendController::builder`] and shared as
/// `Arc<SuspendController>` with every subsystem that registers activities.
pub struct SuspendController {
    cfg: SuspendConfig,
    inner: Mutex<Inner>,
    listeners: ListenerSet,
    bus: Bus,
    runtime: Handle,
    queue: SerialQueue,
    booted: AtomicBool,
    me: Weak<SuspendController>,
}

impl SuspendController {
    /// Returns a builder for the controller.
    pub fn builder(cfg: SuspendConfig) -> SuspendControllerBuilder {
        SuspendControllerBuilder::new(cfg)
    }

    pub(crate) fn new(
        cfg: SuspendConfig,
        listeners: ListenerSet,
        bus: Bus,
        runtime: Handle,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            cfg,
            inner: Mutex::new(Inner {
                state: SuspendState::Suspended,
                registry: PriorityBuckets::new(),
                epoch: 0,
                timer: None,
                waiters: Vec::new(),
                group: None,
            }),
            listeners,
            bus,
            runtime,
            queue: SerialQueue::default(),
            booted: AtomicBool::new(false),
            me: me.clone(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Controller configuration.
    pub fn config(&self) -> &SuspendConfig {
        &self.cfg
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SuspendState {
        self.lock().state
    }

    /// Subscribes to controller events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    // ---------------------------
    // Listeners
    // ---------------------------

    /// Adds a lifecycle listener; adding the same listener twice is a no-op.
    pub fn add_listener(&self, listener: Arc<dyn OperationListener>) {
        self.listeners.add(listener);
    }

    /// Removes a lifecycle listener.
    pub fn remove_listener(&self, listener: &Arc<dyn OperationListener>) {
        self.listeners.remove(listener);
    }

    // ---------------------------
    // Boot
    // ---------------------------

    /// Signals that server boot completed.
    ///
    /// The first call resumes every activity (with [`ServerResumeContext::starting`])
    /// unless [`SuspendConfig::start_suspended`] is set. Later calls do nothing.
    pub fn boot_complete(&self) {
        if self.booted.swap(true, Ordering::AcqRel) {
            tracing::debug!("boot already completed; ignoring");
            return;
        }
        if self.cfg.start_suspended {
            tracing::info!("boot complete; staying suspended until resumed");
            return;
        }
        let _ = self.resume_with(ServerResumeContext::starting());
    }

    // ---------------------------
    // Suspend
    // ---------------------------

    /// Starts a suspend with an advisory `timeout` (`Duration::ZERO` = none).
    ///
    /// No-op if already `Suspended`; joins the drain if one is in progress.
    pub fn suspend(&self, timeout: Duration) -> SuspendCompletion {
        self.suspend_with(ServerSuspendContext::runtime(), timeout)
    }

    /// Starts a suspend with the configured default timeout.
    pub fn suspend_default(&self) -> SuspendCompletion {
        self.suspend(self.cfg.default_timeout)
    }

    /// Starts a suspend, passing `ctx` to stage-based activities.
    pub fn suspend_with(&self, ctx: ServerSuspendContext, timeout: Duration) -> SuspendCompletion {
        let (tx, rx) = oneshot::channel();
        {
            let mut inner = self.lock();
            match inner.state {
                SuspendState::Suspended => {
                    tracing::debug!("suspend requested while suspended; ignoring");
                    return SuspendCompletion::ready(SuspendOutcome::Suspended);
                }
                SuspendState::PreSuspend | SuspendState::Suspending => {
                    tracing::debug!(epoch = inner.epoch, "suspend requested while draining; joining");
                    inner.waiters.push(tx);
                    return SuspendCompletion::new(rx);
                }
                SuspendState::Running => {}
            }

            inner.epoch += 1;
            inner.state = SuspendState::PreSuspend;
            let epoch = inner.epoch;
            let groups = inner.registry.ascending();

            tracing::info!(
                epoch,
                activities = groups.iter().map(|(_, g)| g.len()).sum::<usize>(),
                timeout_ms = timeout.as_millis() as u64,
                starting = ctx.is_starting(),
                stopping = ctx.is_stopping(),
                "suspend requested"
            );
            self.defer(move |ctl| {
                let mut ev = Event::new(EventKind::SuspendRequested);
                if !timeout.is_zero() {
                    ev = ev.with_timeout(timeout);
                }
                ctl.publish(ev);
                ctl.listeners.notify("suspend_started", |l| l.suspend_started());
            });

            if groups.is_empty() {
                inner.state = SuspendState::Suspended;
                self.defer(move |ctl| ctl.suspend_completed(epoch, Vec::new()));
                drop(inner);
                self.queue.run();
                return SuspendCompletion::ready(SuspendOutcome::Suspended);
            }

            inner.waiters.push(tx);
            if !timeout.is_zero() {
                let weak = self.me.clone();
                inner.timer = Some(SuspendTimer::start(&self.runtime, timeout, move || {
                    if let Some(ctl) = weak.upgrade() {
                        ctl.on_timeout(epoch, timeout);
                    }
                }));
            }
            let pass = PhasePass::suspend(
                self.me.clone(),
                epoch,
                Phase::Prepare,
                groups,
                ctx,
                Then::EnterSuspending,
            );
            self.defer(move |_| pass.start());
        }
        self.queue.run();
        SuspendCompletion::new(rx)
    }

    /// Suspends with the stopping context and waits up to `grace` for the drain.
    ///
    /// Returns [`RuntimeError::GraceExceeded`] with the pending activities if the drain
    /// did not finish in time. The controller is not forced into any state.
    pub async fn shutdown(&self, grace: Duration) -> Result<(), RuntimeError> {
        let completion = self.suspend_with(ServerSuspendContext::stopping(), grace);
        match tokio::time::timeout(grace, completion).await {
            Ok(SuspendOutcome::Suspended) => Ok(()),
            Ok(SuspendOutcome::Cancelled) => Err(RuntimeError::SuspendCancelled),
            Err(_) => {
                let pending = self.outstanding();
                tracing::warn!(grace_ms = grace.as_millis() as u64, ?pending, "graceful suspend exceeded grace");
                Err(RuntimeError::GraceExceeded { grace, pending })
            }
        }
    }

    // ---------------------------
    // Resume
    // ---------------------------

    /// Resumes every activity (highest priority group first). No-op if `Running`.
    pub fn resume(&self) -> ResumeCompletion {
        self.resume_with(ServerResumeContext::runtime())
    }

    /// Resumes, passing `ctx` to stage-based activities.
    pub fn resume_with(&self, ctx: ServerResumeContext) -> ResumeCompletion {
        let (tx, rx) = oneshot::channel();
        let timer = {
            let mut inner = self.lock();
            if inner.state == SuspendState::Running {
                tracing::debug!("resume requested while running; ignoring");
                return ResumeCompletion::ready();
            }
            let from = inner.state;
            inner.epoch += 1;
            inner.state = SuspendState::Running;
            inner.group = None;
            let epoch = inner.epoch;
            let waiters = std::mem::take(&mut inner.waiters);
            let pass = PhasePass::resume(self.me.clone(), epoch, inner.registry.descending(), ctx, tx);

            tracing::info!(epoch, from = %from, starting = ctx.is_starting(), "resume requested");
            self.defer(move |ctl| {
                ctl.publish(Event::new(EventKind::ResumeRequested));
                ctl.publish(Event::new(EventKind::SuspendCancelled));
                for w in waiters {
                    let _ = w.send(SuspendOutcome::Cancelled);
                }
                ctl.listeners.notify("cancelled", |l| l.cancelled());
                pass.start();
            });
            inner.timer.take()
        };

        if let Some(timer) = timer {
            timer.cancel();
        }
        self.queue.run();
        ResumeCompletion::new(rx)
    }

    // ---------------------------
    // Introspection
    // ---------------------------

    /// Names of activities that have not finished the phase currently draining.
    pub fn outstanding(&self) -> Vec<String> {
        let inner = self.lock();
        if !inner.state.is_draining() {
            return Vec::new();
        }
        inner
            .group
            .as_ref()
            .map(|c| c.pending())
            .unwrap_or_default()
    }

    /// Number of registered activities.
    pub fn len(&self) -> usize {
        self.lock().registry.len()
    }

    /// True if no activity is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().registry.is_empty()
    }

    /// Priority `activity` is registered at, if registered.
    pub fn priority_of(&self, activity: &Activity) -> Option<SuspendPriority> {
        self.lock().registry.priority_of(activity.id())
    }

    // ---------------------------
    // Helpers used by phase passes
    // ---------------------------

    pub(crate) fn weak(&self) -> Weak<SuspendController> {
        self.me.clone()
    }

    pub(crate) fn runtime(&self) -> &Handle {
        &self.runtime
    }

    pub(crate) fn publish(&self, ev: Event) {
        self.bus.publish(ev);
    }

    /// Queues `job`; may be called with the controller lock held.
    fn defer<F>(&self, job: F)
    where
        F: FnOnce(&SuspendController) + Send + 'static,
    {
        let me = self.me.clone();
        self.queue.push(move || {
            if let Some(ctl) = me.upgrade() {
                job(&ctl);
            }
        });
    }

    /// Queues `job` and drains the queue unless another thread already is.
    pub(crate) fn submit<F>(&self, job: F)
    where
        F: FnOnce(&SuspendController) + Send + 'static,
    {
        self.defer(job);
        self.queue.run();
    }

    /// True while `epoch` is the latest suspend or resume.
    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.lock().epoch == epoch
    }

    pub(crate) fn track(&self, epoch: u64, countdown: &Arc<Countdown>) {
        let mut inner = self.lock();
        if inner.epoch == epoch && inner.state.is_draining() {
            inner.group = Some(Arc::clone(countdown));
        }
    }

    /// `PreSuspend -> Suspending` for `epoch`; false if superseded.
    pub(crate) fn enter_suspending(&self, epoch: u64) -> bool {
        {
            let mut inner = self.lock();
            if inner.epoch != epoch || inner.state != SuspendState::PreSuspend {
                return false;
            }
            inner.state = SuspendState::Suspending;
        }
        tracing::debug!(epoch, "all activities prepared; suspending");
        true
    }

    /// Runs from a queued job, so notifications below precede any later transition's.
    pub(crate) fn finish_suspend(&self, epoch: u64) {
        let (timer, waiters) = {
            let mut inner = self.lock();
            if inner.epoch != epoch || !inner.state.is_draining() {
                return;
            }
            inner.state = SuspendState::Suspended;
            inner.group = None;
            (inner.timer.take(), std::mem::take(&mut inner.waiters))
        };

        if let Some(timer) = timer {
            timer.cancel();
        }
        self.suspend_completed(epoch, waiters);
    }

    fn suspend_completed(&self, epoch: u64, waiters: Vec<oneshot::Sender<SuspendOutcome>>) {
        tracing::info!(epoch, "suspend complete");
        self.publish(Event::new(EventKind::SuspendCompleted));
        for w in waiters {
            let _ = w.send(SuspendOutcome::Suspended);
        }
        self.listeners.notify("complete", |l| l.complete());
    }

    pub(crate) fn finish_resume(&self, epoch: u64, done: oneshot::Sender<()>) {
        tracing::debug!(epoch, "all activities resumed");
        self.publish(Event::new(EventKind::ResumeCompleted));
        let _ = done.send(());
    }

    /// Timer expiry; accepted at most once per drain.
    fn on_timeout(&self, epoch: u64, timeout: Duration) {
        {
            let mut inner = self.lock();
            if inner.epoch != epoch || !inner.state.is_draining() || inner.timer.take().is_none() {
                return;
            }
            let pending = inner
                .group
                .as_ref()
                .map(|c| c.pending())
                .unwrap_or_default();
            tracing::warn!(
                epoch,
                timeout_ms = timeout.as_millis() as u64,
                ?pending,
                "suspend did not complete within timeout"
            );
            self.defer(move |ctl| {
                ctl.publish(Event::new(EventKind::SuspendTimedOut).with_timeout(timeout));
                ctl.listeners.notify("timeout", |l| l.timeout());
            });
        }
        self.queue.run();
    }

    pub(crate) fn activity_failed(&self, activity: &Activity, phase: Phase, err: &ActivityError) {
        tracing::warn!(
            activity = activity.name(),
            phase = %phase,
            error = %err,
            "activity failed; treating as done"
        );
        self.publish(
            Event::new(EventKind::ActivityFailed)
                .with_activity(activity.label())
                .with_phase(phase)
                .with_reason(err.as_message()),
        );
    }

    pub(crate) fn stage_finished(
        &self,
        activity: &Activity,
        phase: Phase,
        result: Result<(), ActivityError>,
    ) {
        match result {
            Ok(()) => {
                tracing::trace!(activity = activity.name(), phase = %phase, "stage complete");
            }
            Err(err) => self.activity_failed(activity, phase, &err),
        }
    }

    // ---------------------------
    // Registry
    // ---------------------------

    fn insert(&self, activity: &Activity, priority: SuspendPriority) -> bool {
        {
            let mut inner = self.lock();
            if !inner.registry.insert(activity.clone(), priority) {
                tracing::debug!(
                    activity = activity.name(),
                    "activity already registered; keeping original priority"
                );
                return false;
            }
            if inner.state != SuspendState::Running {
                let late = activity.clone();
                self.defer(move |ctl| ctl.suspend_late(late));
            }
        }

        tracing::debug!(activity = activity.name(), priority = priority.value(), "activity registered");
        self.publish(
            Event::new(EventKind::ActivityRegistered)
                .with_activity(activity.label())
                .with_priority(priority),
        );
        self.queue.run();
        true
    }

    /// Suspends an activity registered while not running; nothing to drain.
    fn suspend_late(&self, activity: Activity) {
        let ctx = if self.booted.load(Ordering::Acquire) {
            ServerSuspendContext::runtime()
        } else {
            ServerSuspendContext::starting()
        };
        match &activity {
            Activity::Legacy(a) => {
                let res = catch_unwind(AssertUnwindSafe(|| {
                    a.suspended(ServerActivityCallback::noop())
                }));
                if let Err(panic) = res {
                    let err = ActivityError::Panicked {
                        info: panic_info(panic.as_ref()),
                    };
                    self.activity_failed(&activity, Phase::Suspend, &err);
                }
            }
            Activity::Suspendable(a) => {
                let a = Arc::clone(a);
                let stage = async move {
                    a.prepare(&ctx).await?;
                    a.suspend(&ctx).await
                }
                .boxed();
                drain::drive(
                    self,
                    activity,
                    Phase::Suspend,
                    stage,
                    ServerActivityCallback::noop(),
                );
            }
        }
    }
}

impl SuspensionStateProvider for SuspendController {
    fn state(&self) -> SuspendState {
        self.lock().state
    }
}

impl SuspendableActivityRegistry for SuspendController {
    fn register_activity(&self, activity: Activity, priority: SuspendPriority) {
        self.insert(&activity, priority);
    }

    fn unregister_activity(&self, activity: &Activity) {
        let removed = self.lock().registry.remove(activity.id());
        if let Some((_, priority)) = removed {
            tracing::debug!(activity = activity.name(), "activity unregistered");
            self.publish(
                Event::new(EventKind::ActivityUnregistered)
                    .with_activity(activity.label())
                    .with_priority(priority),
            );
        }
    }
}

impl SuspendableActivityRegistrar for SuspendController {
    fn register(&self, activity: Activity, priority: SuspendPriority) -> Registration {
        self.insert(&activity, priority);
        let registry: Weak<dyn SuspendableActivityRegistry> = self.me.clone();
        Registration::new(registry, activity)
    }
}
