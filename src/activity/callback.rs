//! # Completion callbacks and the per-phase countdown.
//!
//! Every activity invoked in a phase receives its own [`ServerActivityCallback`].
//! All callbacks of one priority group share a [`Countdown`]:
//!
//! ```text
//! Countdown { remaining = N, then = continuation }
//!    ├─► callback[0].done() ─┐
//!    ├─► callback[1].done() ─┼─► CAS decrement ─► 0? ─► run `then` (exactly once)
//!    └─► callback[N-1].done()┘
//! ```
//!
//! ## Rules
//! - `done()` is lock-free and may be called from any thread.
//! - Each callback counts once; further `done()` calls on it (or its clones) are
//!   ignored and logged.
//! - The thread that takes `remaining` to zero runs the continuation inline.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type Continuation = Box<dyn FnOnce() + Send + 'static>;

/// One participant of a countdown.
struct Slot {
    name: Arc<str>,
    fired: AtomicBool,
}

/// Shared outstanding count for one group of activities in one phase.
pub(crate) struct Countdown {
    remaining: AtomicUsize,
    slots: Vec<Slot>,
    then: Mutex<Option<Continuation>>,
}

impl Countdown {
    /// Creates a countdown with one slot per name.
    ///
    /// With zero names the continuation never runs; callers skip empty groups.
    pub(crate) fn new<F>(names: Vec<Arc<str>>, then: F) -> Arc<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        Arc::new(Self {
            remaining: AtomicUsize::new(names.len()),
            slots: names
                .into_iter()
                .map(|name| Slot {
                    name,
                    fired: AtomicBool::new(false),
                })
                .collect(),
            then: Mutex::new(Some(Box::new(then))),
        })
    }

    /// Returns the callback bound to slot `index`.
    pub(crate) fn callback(self: &Arc<Self>, index: usize) -> ServerActivityCallback {
        debug_assert!(index < self.slots.len());
        ServerActivityCallback {
            countdown: Arc::clone(self),
            slot: index,
        }
    }

    /// Number of participants that have not reported yet.
    #[cfg(test)]
    pub(crate) fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Names of participants that have not reported yet.
    pub(crate) fn pending(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|s| !s.fired.load(Ordering::Acquire))
            .map(|s| s.name.to_string())
            .collect()
    }

    fn complete(&self, index: usize) -> bool {
        let slot = &self.slots[index];
        if slot.fired.swap(true, Ordering::AcqRel) {
            tracing::warn!(
                activity = %slot.name,
                "done() called more than once for the same phase; ignored"
            );
            return false;
        }

        let prev = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if prev == Ok(1) {
            let then = self
                .then
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(then) = then {
                then();
            }
        }
        true
    }
}

/// Completion handle passed to callback-style activities.
///
/// Call [`done`](Self::done) exactly once when the phase is finished; the controller
/// does not move to the next phase until every activity of the group has done so.
/// The handle is cheap to clone and may be moved to another thread; clones share the
/// same one-shot state.
#[derive(Clone)]
pub struct ServerActivityCallback {
    countdown: Arc<Countdown>,
    slot: usize,
}

impl ServerActivityCallback {
    /// A callback that is not tied to any drain.
    ///
    /// Handed to activities registered while the controller is not running: there are
    /// no outstanding requests to wait for.
    pub fn noop() -> Self {
        Countdown::new(vec![Arc::from("noop")], || {}).callback(0)
    }

    /// Signals that the activity finished the current phase.
    ///
    /// Returns `false` (and does nothing) if this callback was already completed.
    pub fn done(&self) -> bool {
        self.countdown.complete(self.slot)
    }

    /// True once `done()` has been called on this callback (or a clone).
    pub fn is_done(&self) -> bool {
        self.countdown.slots[self.slot].fired.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for ServerActivityCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerActivityCallback")
            .field("activity", &self.countdown.slots[self.slot].name)
            .field("done", &self.is_done())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn names(n: usize) -> Vec<Arc<str>> {
        (0..n).map(|i| Arc::from(format!("a{i}"))).collect()
    }

    #[test]
    fn test_continuation_runs_after_last_done() {
        let fired = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&fired);
        let cd = Countdown::new(names(3), move || {
            f.fetch_add(1, Ordering::SeqCst);
        });

        let cbs: Vec<_> = (0..3).map(|i| cd.callback(i)).collect();
        assert!(cbs[0].done());
        assert!(cbs[2].done());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(cd.pending(), vec!["a1".to_string()]);

        assert!(cbs[1].done());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(cd.remaining(), 0);
        assert!(cd.pending().is_empty());
    }

    #[test]
    fn test_double_done_is_ignored() {
        let fired = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&fired);
        let cd = Countdown::new(names(2), move || {
            f.fetch_add(1, Ordering::SeqCst);
        });

        let first = cd.callback(0);
        let clone = first.clone();
        assert!(first.done());
        assert!(!first.done());
        assert!(!clone.done());
        assert_eq!(cd.remaining(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        assert!(cd.callback(1).done());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_done_fires_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&fired);
        let cd = Countdown::new(names(64), move || {
            f.fetch_add(1, Ordering::SeqCst);
        });

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let cb = cd.callback(i);
                thread::spawn(move || {
                    cb.done();
                    cb.done();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(cd.remaining(), 0);
    }

    #[test]
    fn test_noop_callback() {
        let cb = ServerActivityCallback::noop();
        assert!(!cb.is_done());
        assert!(cb.done());
        assert!(cb.is_done());
        assert!(!cb.done());
    }
}
