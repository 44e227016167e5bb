// src/cluster/history.rs
use std::collections::VecDeque;
use serde::Serialize;

use crate::config::subsystems::cluster::DEFAULT_HISTORY_CAPACITY;
use super::types::MergeRecord;

/// Trailing FIFO log of the smaller cluster of each recent merge.
#[derive(Debug, Clone, Serialize)]
pub struct MergeHistory {
    capacity: usize,
    entries: VecDeque<MergeRecord>,
}

impl MergeHistory {
    /// `capacity` must be positive; `ClusterConfig::validate` rejects zero.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "merge history needs a positive capacity");
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn record(&mut self, record: MergeRecord) {
        self.entries.push_back(record);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest to newest.
    pub fn entries(&self) -> impl Iterator<Item = &MergeRecord> {
        self.entries.iter()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.entries.iter().map(|r| r.size).collect()
    }

    pub fn into_vec(self) -> Vec<MergeRecord> {
        self.entries.into()
    }
}

impl Default for MergeHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::cluster::Prototype;

    fn record(size: usize) -> MergeRecord {
        let columns: Arc<[String]> = vec!["a".to_string()].into();
        MergeRecord {
            size,
            prototype: Prototype::new(columns, vec![size as f64]),
        }
    }

    #[test]
    fn keeps_everything_below_capacity() {
        let mut history = MergeHistory::default();
        for size in 1..=20 {
            history.record(record(size));
        }
        assert_eq!(history.len(), 20);
        assert_eq!(history.sizes(), (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn evicts_oldest_first() {
        let mut history = MergeHistory::default();
        for size in 1..=27 {
            history.record(record(size));
            assert!(history.len() <= 20);
        }
        assert_eq!(history.sizes(), (8..=27).collect::<Vec<_>>());
        assert_eq!(history.entries().next().unwrap().prototype.values(), &[8.0]);
    }

    #[test]
    fn custom_capacity() {
        let mut history = MergeHistory::new(2);
        for size in [5, 6, 7] {
            history.record(record(size));
        }
        assert_eq!(history.capacity(), 2);
        assert_eq!(history.into_vec().iter().map(|r| r.size).collect::<Vec<_>>(), vec![6, 7]);
    }
}
