//! # Event bus for broadcasting controller events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. The controller publishes
//! from whichever thread drives a transition; one forwarding task hands events to the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and works outside the runtime.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for controller events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers; dropped if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_publish_reaches_subscribers_after_subscribe() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::SuspendRequested));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::SuspendCompleted));
        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::SuspendCompleted);
    }
}
