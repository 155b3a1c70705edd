//! # ListenerSet: copy-on-iterate fan-out.
//!
//! Notifications iterate over a snapshot taken under a short lock, so a listener that
//! registers or removes listeners from inside a callback neither deadlocks nor changes
//! the current fan-out.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::OperationListener;
use crate::error::panic_info;

/// Registered listeners.
#[derive(Default)]
pub(crate) struct ListenerSet {
    inner: Mutex<Vec<Arc<dyn OperationListener>>>,
}

fn same(a: &Arc<dyn OperationListener>, b: &Arc<dyn OperationListener>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

impl ListenerSet {
    pub(crate) fn new(initial: Vec<Arc<dyn OperationListener>>) -> Self {
        let set = Self::default();
        for l in initial {
            set.add(l);
        }
        set
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn OperationListener>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a listener; adding the same listener twice is a no-op.
    pub(crate) fn add(&self, listener: Arc<dyn OperationListener>) {
        let mut g = self.lock();
        if !g.iter().any(|l| same(l, &listener)) {
            g.push(listener);
        }
    }

    pub(crate) fn remove(&self, listener: &Arc<dyn OperationListener>) {
        self.lock().retain(|l| !same(l, listener));
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Invokes `f` on a snapshot of the listeners.
    pub(crate) fn notify<F>(&self, what: &'static str, f: F)
    where
        F: Fn(&dyn OperationListener),
    {
        let snapshot: Vec<Arc<dyn OperationListener>> = self.lock().clone();
        for l in snapshot {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| f(l.as_ref()))) {
                tracing::warn!(
                    notification = what,
                    info = %panic_info(panic.as_ref()),
                    "operation listener panicked"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl OperationListener for Counter {
        fn complete(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Spawner {
        set: Arc<ListenerSet>,
        child: Arc<Counter>,
    }

    impl OperationListener for Spawner {
        fn complete(&self) {
            self.set.add(self.child.clone());
        }
    }

    struct Boom;

    impl OperationListener for Boom {
        fn complete(&self) {
            panic!("listener bug");
        }
    }

    #[test]
    fn test_add_is_idempotent_and_remove_works() {
        let set = ListenerSet::default();
        let c: Arc<dyn OperationListener> = Arc::new(Counter::default());
        set.add(c.clone());
        set.add(c.clone());
        assert_eq!(set.len(), 1);
        set.remove(&c);
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_listener_added_mid_notification_waits_for_next_round() {
        let set = Arc::new(ListenerSet::default());
        let child = Arc::new(Counter::default());
        set.add(Arc::new(Spawner {
            set: Arc::clone(&set),
            child: Arc::clone(&child),
        }));

        set.notify("complete", |l| l.complete());
        assert_eq!(child.0.load(Ordering::SeqCst), 0);
        assert_eq!(set.len(), 2);

        set.notify("complete", |l| l.complete());
        assert_eq!(child.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let counter = Arc::new(Counter::default());
        let listeners: Vec<Arc<dyn OperationListener>> = vec![Arc::new(Boom), counter.clone()];
        let set = ListenerSet::new(listeners);
        set.notify("complete", |l| l.complete());
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }
}
