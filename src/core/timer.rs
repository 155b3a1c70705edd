//! # Advisory suspend timer.
//!
//! A one-shot delayed task on the tokio runtime, raced against a
//! [`CancellationToken`]. Firing only *offers* the timeout to the controller, which
//! accepts it at most once per suspend cycle; cancellation and natural completion
//! race through the controller lock, so no stale duplicate notification escapes.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Handle to a pending advisory timer.
pub(crate) struct SuspendTimer {
    token: CancellationToken,
}

impl SuspendTimer {
    /// Schedules `on_fire` after `after`, unless cancelled first.
    pub(crate) fn start<F>(runtime: &Handle, after: Duration, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();
        runtime.spawn(async move {
            tokio::select! {
                _ = child.cancelled() => {}
                _ = tokio::time::sleep(after) => on_fire(),
            }
        });
        Self { token }
    }

    pub(crate) fn cancel(self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&fired);
        let _t = SuspendTimer::start(&Handle::current(), Duration::from_millis(50), move || {
            f.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&fired);
        let t = SuspendTimer::start(&Handle::current(), Duration::from_millis(50), move || {
            f.fetch_add(1, Ordering::SeqCst);
        });
        t.cancel();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
