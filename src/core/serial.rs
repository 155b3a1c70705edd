//! # Serial work queue.
//!
//! Every call into activities and listeners goes through one FIFO queue, so they
//! observe transitions in the order the controller decided them.
//!
//! ```text
//! push(job) under the controller lock ─► [ job1, job2, ... ]
//! run() after the lock is released
//!   ├─► someone is already draining? ─► return (they run our job)
//!   └─► pop + run until empty
//! ```
//!
//! ## Rules
//! - No lock is held while a job runs; jobs may push more jobs (re-entrancy only
//!   enqueues, it never recurses).
//! - The draining thread is whichever thread found the queue idle: the caller of
//!   `suspend()`/`resume()`, an activity thread calling `done()`, or a runtime worker.
//! - A panicking job is logged and the queue keeps draining.

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::panic_info;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Queue {
    jobs: VecDeque<Job>,
    draining: bool,
}

/// FIFO of deferred activity and listener calls.
#[derive(Default)]
pub(crate) struct SerialQueue {
    inner: Mutex<Queue>,
}

impl SerialQueue {
    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `job`; it runs on the next [`run`](Self::run).
    pub(crate) fn push<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.lock().jobs.push_back(Box::new(job));
    }

    /// Runs queued jobs on the calling thread unless another thread already does.
    pub(crate) fn run(&self) {
        {
            let mut q = self.lock();
            if q.draining {
                return;
            }
            q.draining = true;
        }
        loop {
            let job = {
                let mut q = self.lock();
                match q.jobs.pop_front() {
                    Some(job) => job,
                    None => {
                        q.draining = false;
                        return;
                    }
                }
            };
            if let Err(panic) = catch_unwind(AssertUnwindSafe(job)) {
                tracing::error!(info = %panic_info(panic.as_ref()), "controller job panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_nested_push_runs_after_current_job() {
        let q = Arc::new(SerialQueue::default());
        let log = Arc::new(Mutex::new(Vec::new()));

        let (q2, l2) = (Arc::clone(&q), Arc::clone(&log));
        q.push(move || {
            l2.lock().unwrap().push("outer:start");
            let l3 = Arc::clone(&l2);
            q2.push(move || l3.lock().unwrap().push("inner"));
            q2.run();
            l2.lock().unwrap().push("outer:end");
        });
        q.run();

        assert_eq!(*log.lock().unwrap(), vec!["outer:start", "outer:end", "inner"]);
    }

    #[test]
    fn test_panicking_job_does_not_stall_queue() {
        let q = SerialQueue::default();
        let ran = Arc::new(Mutex::new(false));
        let r = Arc::clone(&ran);
        q.push(|| panic!("job bug"));
        q.push(move || *r.lock().unwrap() = true);
        q.run();
        assert!(*ran.lock().unwrap());

        q.push(|| {});
        q.run();
        assert!(q.lock().jobs.is_empty());
        assert!(!q.lock().draining);
    }
}
