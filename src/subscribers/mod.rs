//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] fan-out for
//! handling controller events broadcast through the [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! SuspendController ── publish(Event) ──► Bus ──► forwarder ──► SubscriberSet
//!                                                                  │
//!                                                   ┌──────────────┼──────────┐
//!                                                   ▼              ▼          ▼
//!                                               LogWriter       Metrics    Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;

pub use set::SubscriberSet;
pub use subscriber::Subscribe;
