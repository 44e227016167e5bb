// src/cluster/types.rs
use serde::Serialize;
use super::prototype::Prototype;

/// A group of row indices merged as one unit.
///
/// `id` follows the dendrogram convention: original rows are `0..n`, the
/// cluster produced by merge step `s` is `n + s`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub id: usize,
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn new(id: usize, members: Vec<usize>) -> Self {
        Self { id, members }
    }

    pub fn singleton(row: usize) -> Self {
        Self { id: row, members: vec![row] }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Size and prototype of the smaller cluster in a merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeRecord {
    pub size: usize,
    pub prototype: Prototype,
}

/// Everything observable about one merge iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeEvent {
    /// 0-based merge counter
    pub step: usize,
    /// Matrix positions of the merged pair, `c1 < c2`
    pub positions: (usize, usize),
    /// Linkage ids of the merged pair, in position order
    pub cluster_ids: (usize, usize),
    pub merged_id: usize,
    pub distance: f64,
    pub smaller: MergeRecord,
    pub merged_size: usize,
    /// Clusters left once this merge is applied
    pub clusters_remaining: usize,
    /// Set on the final merge only: the larger of the last two clusters
    pub terminal: Option<MergeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    Running,
    Done,
}
