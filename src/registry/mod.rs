//! Activity registry: priority buckets and the registration façade.

mod buckets;
mod registration;

pub(crate) use buckets::PriorityBuckets;

pub use registration::{Registration, SuspendableActivityRegistrar, SuspendableActivityRegistry};
