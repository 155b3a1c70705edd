//! Awaitable results of `suspend()` and `resume()`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

/// How a suspend cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendOutcome {
    /// Every activity drained; the controller is `Suspended`.
    Suspended,
    /// `resume()` was called first (or the controller was dropped).
    Cancelled,
}

/// Resolves when the suspend it was returned for completes or is cancelled.
///
/// Dropping it does not affect the suspend.
#[derive(Debug)]
pub struct SuspendCompletion {
    rx: oneshot::Receiver<SuspendOutcome>,
    outcome: Option<SuspendOutcome>,
}

impl SuspendCompletion {
    pub(crate) fn new(rx: oneshot::Receiver<SuspendOutcome>) -> Self {
        Self { rx, outcome: None }
    }

    pub(crate) fn ready(outcome: SuspendOutcome) -> Self {
        let (_tx, rx) = oneshot::channel();
        Self {
            rx,
            outcome: Some(outcome),
        }
    }

    /// Returns the outcome if already known, without waiting.
    pub fn try_outcome(&mut self) -> Option<SuspendOutcome> {
        if self.outcome.is_none() {
            self.outcome = match self.rx.try_recv() {
                Ok(o) => Some(o),
                Err(oneshot::error::TryRecvError::Empty) => None,
                Err(oneshot::error::TryRecvError::Closed) => Some(SuspendOutcome::Cancelled),
            };
        }
        self.outcome
    }
}

impl Future for SuspendCompletion {
    type Output = SuspendOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(o) = self.outcome {
            return Poll::Ready(o);
        }
        let outcome = match Pin::new(&mut self.rx).poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(r) => r.unwrap_or(SuspendOutcome::Cancelled),
        };
        self.outcome = Some(outcome);
        Poll::Ready(outcome)
    }
}

/// Resolves once every activity has finished its resume stage.
#[derive(Debug)]
pub struct ResumeCompletion {
    rx: oneshot::Receiver<()>,
    done: bool,
}

impl ResumeCompletion {
    pub(crate) fn new(rx: oneshot::Receiver<()>) -> Self {
        Self { rx, done: false }
    }

    pub(crate) fn ready() -> Self {
        let (_tx, rx) = oneshot::channel();
        Self { rx, done: true }
    }

    /// True once every resume stage finished.
    pub fn is_complete(&mut self) -> bool {
        if !self.done {
            self.done = !matches!(self.rx.try_recv(), Err(oneshot::error::TryRecvError::Empty));
        }
        self.done
    }
}

impl Future for ResumeCompletion {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.done {
            return Poll::Ready(());
        }
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(_) => {
                self.done = true;
                Poll::Ready(())
            }
        }
    }
}
