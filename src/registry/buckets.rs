//! # Priority buckets.
//!
//! Ordered map `priority -> insertion-ordered activities`, plus an identity index.
//!
//! ```text
//! BTreeMap<SuspendPriority, Vec<Activity>>     HashMap<ActivityId, SuspendPriority>
//!   0  ─► [a, d]                                 a ─► 0, d ─► 0
//!   5  ─► [b]                                    b ─► 5
//!   10 ─► [c]                                    c ─► 10
//! ```
//!
//! ## Rules
//! - Re-inserting a known activity is a no-op: it keeps its original priority.
//! - Empty buckets are removed, so snapshots never contain empty groups.

use std::collections::{BTreeMap, HashMap};

use crate::activity::{Activity, ActivityId, SuspendPriority};

/// Activities grouped by priority.
#[derive(Default)]
pub(crate) struct PriorityBuckets {
    buckets: BTreeMap<SuspendPriority, Vec<Activity>>,
    index: HashMap<ActivityId, SuspendPriority>,
}

impl PriorityBuckets {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds `activity` at `priority`. Returns `false` if it was already registered.
    pub(crate) fn insert(&mut self, activity: Activity, priority: SuspendPriority) -> bool {
        let id = activity.id();
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, priority);
        self.buckets.entry(priority).or_default().push(activity);
        true
    }

    /// Removes `id`; returns the removed activity and its priority.
    pub(crate) fn remove(&mut self, id: ActivityId) -> Option<(Activity, SuspendPriority)> {
        let priority = self.index.remove(&id)?;
        let bucket = self.buckets.get_mut(&priority)?;
        let pos = bucket.iter().position(|a| a.id() == id)?;
        let activity = bucket.remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(&priority);
        }
        Some((activity, priority))
    }

    pub(crate) fn priority_of(&self, id: ActivityId) -> Option<SuspendPriority> {
        self.index.get(&id).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Groups in suspend order (lowest priority first).
    pub(crate) fn ascending(&self) -> Vec<(SuspendPriority, Vec<Activity>)> {
        self.buckets
            .iter()
            .map(|(p, group)| (*p, group.clone()))
            .collect()
    }

    /// Groups in resume order (highest priority first).
    pub(crate) fn descending(&self) -> Vec<(SuspendPriority, Vec<Activity>)> {
        self.buckets
            .iter()
            .rev()
            .map(|(p, group)| (*p, group.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ServerActivity, ServerActivityCallback};
    use std::sync::Arc;

    struct Named(&'static str);

    impl ServerActivity for Named {
        fn pre_suspend(&self, cb: ServerActivityCallback) {
            cb.done();
        }
        fn suspended(&self, cb: ServerActivityCallback) {
            cb.done();
        }
        fn resume(&self) {}
        fn name(&self) -> &str {
            self.0
        }
    }

    fn act(name: &'static str) -> Activity {
        Activity::legacy(Arc::new(Named(name)))
    }

    fn names(groups: &[(SuspendPriority, Vec<Activity>)]) -> Vec<Vec<String>> {
        groups
            .iter()
            .map(|(_, g)| g.iter().map(|a| a.name().to_string()).collect())
            .collect()
    }

    #[test]
    fn test_groups_are_ordered_by_priority() {
        let mut b = PriorityBuckets::new();
        b.insert(act("c"), SuspendPriority::LAST);
        b.insert(act("a"), SuspendPriority::FIRST);
        b.insert(act("b1"), SuspendPriority::DEFAULT);
        b.insert(act("b2"), SuspendPriority::DEFAULT);

        assert_eq!(
            names(&b.ascending()),
            vec![vec!["a"], vec!["b1", "b2"], vec!["c"]]
        );
        assert_eq!(
            names(&b.descending()),
            vec![vec!["c"], vec!["b1", "b2"], vec!["a"]]
        );
        assert_eq!(b.len(), 4);
    }

    #[test]
    fn test_reinsert_keeps_original_priority() {
        let mut b = PriorityBuckets::new();
        let a = act("a");
        assert!(b.insert(a.clone(), SuspendPriority::FIRST));
        assert!(!b.insert(a.clone(), SuspendPriority::LAST));
        assert_eq!(b.priority_of(a.id()), Some(SuspendPriority::FIRST));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_remove_drops_empty_bucket() {
        let mut b = PriorityBuckets::new();
        let a = act("a");
        b.insert(a.clone(), SuspendPriority::FIRST);
        b.insert(act("b"), SuspendPriority::LAST);

        let (removed, p) = b.remove(a.id()).expect("registered");
        assert_eq!(removed.name(), "a");
        assert_eq!(p, SuspendPriority::FIRST);
        assert!(b.remove(a.id()).is_none());
        assert_eq!(names(&b.ascending()), vec![vec!["b"]]);
        assert!(!b.is_empty());
    }
}
