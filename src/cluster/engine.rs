// src/cluster/engine.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use log::{debug, info, trace};

use crate::config::subsystems::cluster::{ClusterConfig, RebuildStrategy};
use crate::error::{Error, Result};
use crate::table::AttributeTable;
use super::distance::{DistanceMatrix, MatrixProgress, NoProgress};
use super::history::MergeHistory;
use super::linkage::Linkage;
use super::prototype::{euclidean, mean_vector, Prototype};
use super::types::{Cluster, EngineState, MergeEvent, MergeRecord};

/// Callbacks fired while the engine runs. Every method defaults to a no-op.
pub trait MergeObserver {
    /// Sink for distance-matrix build progress.
    fn matrix_progress(&self) -> &dyn MatrixProgress {
        &NoProgress
    }

    /// Start of an iteration, with the number of clusters before the merge.
    fn clusters_left(&mut self, _count: usize) {}

    fn merged(&mut self, _event: &MergeEvent) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default)]
pub struct SilentObserver;

impl MergeObserver for SilentObserver {}

/// What a finished run leaves behind.
#[derive(Debug, Clone)]
pub struct ClusteringOutcome {
    pub rows: usize,
    pub merges: usize,
    pub history: MergeHistory,
    /// Larger of the final two clusters; absent when the table had one row
    pub terminal: Option<MergeRecord>,
    pub linkage: Linkage,
    pub final_cluster: Cluster,
}

/// Agglomerative clustering over cluster prototypes.
///
/// Starts from one singleton cluster per row and merges the nearest pair
/// until one cluster is left. The engine owns the cluster list and the
/// distance matrix; the table is only borrowed.
pub struct MergeEngine<'t, T: AttributeTable + ?Sized> {
    table: &'t T,
    columns: Arc<[String]>,
    clusters: Vec<Cluster>,
    // Prototype vectors aligned with `clusters`
    prototypes: Vec<Vec<f64>>,
    matrix: DistanceMatrix,
    history: MergeHistory,
    linkage: Linkage,
    terminal: Option<MergeRecord>,
    merges: usize,
    rebuild: RebuildStrategy,
    // Present only when the matrix is built in parallel
    pool: Option<rayon::ThreadPool>,
    cancel: Option<Arc<AtomicBool>>,
    matrix_ready: bool,
}

impl<'t, T: AttributeTable + ?Sized> MergeEngine<'t, T> {
    pub fn new(table: &'t T, config: &ClusterConfig) -> Result<Self> {
        config.validate()?;
        let rows = table.row_count();
        if rows == 0 {
            return Err(Error::EmptyTable);
        }

        let pool = if config.parallel {
            Some(rayon::ThreadPoolBuilder::new()
                .num_threads(config.effective_threads())
                .build()?)
        } else {
            None
        };

        let clusters: Vec<Cluster> = (0..rows).map(Cluster::singleton).collect();
        let prototypes = (0..rows).map(|row| mean_vector(&[row], table)).collect();

        debug!(
            "Engine ready: {} rows, {} attributes, rebuild={}, threads={}",
            rows,
            table.column_count(),
            config.rebuild.as_str(),
            config.effective_threads()
        );

        Ok(Self {
            table,
            columns: table.shared_columns(),
            clusters,
            prototypes,
            matrix: DistanceMatrix::build(&[], &NoProgress),
            history: MergeHistory::new(config.history_capacity),
            linkage: Linkage::new(rows),
            terminal: None,
            merges: 0,
            rebuild: config.rebuild,
            pool,
            cancel: None,
            matrix_ready: false,
        })
    }

    /// Polled between iterations; once set, [`run`](Self::run) stops with
    /// [`Error::Cancelled`].
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn state(&self) -> EngineState {
        if self.clusters.len() > 1 {
            EngineState::Running
        } else {
            EngineState::Done
        }
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn history(&self) -> &MergeHistory {
        &self.history
    }

    pub fn merges(&self) -> usize {
        self.merges
    }

    /// Current distance matrix, built on first use.
    pub fn distance_matrix(&mut self) -> &DistanceMatrix {
        self.ensure_matrix(&NoProgress);
        &self.matrix
    }

    pub fn prototype_of(&self, position: usize) -> Prototype {
        Prototype::new(Arc::clone(&self.columns), self.prototypes[position].clone())
    }

    /// Performs one merge. Returns `None` once a single cluster is left.
    pub fn step(&mut self, observer: &mut dyn MergeObserver) -> Option<MergeEvent> {
        if self.state() == EngineState::Done {
            return None;
        }

        self.ensure_matrix(observer.matrix_progress());
        observer.clusters_left(self.clusters.len());

        let (c1, c2, distance) = self.matrix.nearest_pair()?;
        trace!("Nearest pair ({}, {}) at {}", c1, c2, distance);

        // Equal sizes count c2 as the smaller one
        let (smaller, larger) = if self.clusters[c1].len() < self.clusters[c2].len() {
            (c1, c2)
        } else {
            (c2, c1)
        };

        let smaller_record = MergeRecord {
            size: self.clusters[smaller].len(),
            prototype: self.prototype_of(smaller),
        };
        self.history.record(smaller_record.clone());

        let terminal = if self.clusters.len() == 2 {
            let record = MergeRecord {
                size: self.clusters[larger].len(),
                prototype: self.prototype_of(larger),
            };
            info!("Length of bigger cluster: {}", record.size);
            info!("Prototype of bigger cluster: {}", record.prototype);
            self.terminal = Some(record.clone());
            Some(record)
        } else {
            None
        };

        let merged_id = self.linkage.leaves() + self.merges;
        let cluster_ids = (self.clusters[c1].id, self.clusters[c2].id);

        // c1 < c2, so removing c2 first leaves c1 in place
        let second = self.clusters.remove(c2);
        let first = self.clusters.remove(c1);
        self.prototypes.remove(c2);
        self.prototypes.remove(c1);

        let mut members = first.members;
        members.extend(second.members);
        let merged_prototype = mean_vector(&members, self.table);
        let merged = Cluster::new(merged_id, members);
        let merged_size = merged.len();
        self.clusters.push(merged);

        match self.rebuild {
            RebuildStrategy::Full => {
                self.prototypes.push(merged_prototype);
                self.matrix_ready = false;
                if self.clusters.len() > 1 {
                    self.ensure_matrix(observer.matrix_progress());
                }
            },
            RebuildStrategy::Incremental => {
                let row: Vec<f64> = self.prototypes
                    .iter()
                    .map(|p| euclidean(p, &merged_prototype))
                    .collect();
                self.matrix = self.matrix.merged(c1, c2, &row);
                self.prototypes.push(merged_prototype);
            },
        }

        let event = MergeEvent {
            step: self.merges,
            positions: (c1, c2),
            cluster_ids,
            merged_id,
            distance,
            smaller: smaller_record,
            merged_size,
            clusters_remaining: self.clusters.len(),
            terminal,
        };
        self.merges += 1;
        self.linkage.push(&event);
        observer.merged(&event);
        Some(event)
    }

    /// Merges until one cluster is left.
    pub fn run(mut self, observer: &mut dyn MergeObserver) -> Result<ClusteringOutcome> {
        let rows = self.table.row_count();
        info!("Agglomerating {} rows", rows);

        while self.state() == EngineState::Running {
            if self.is_cancelled() {
                info!("Cancellation requested after {} merges", self.merges);
                return Err(Error::Cancelled { merges: self.merges });
            }
            self.step(observer);
        }

        info!("Agglomeration finished after {} merges", self.merges);
        let final_cluster = self.clusters.pop().ok_or(Error::EmptyTable)?;
        Ok(ClusteringOutcome {
            rows,
            merges: self.merges,
            history: self.history,
            terminal: self.terminal,
            linkage: self.linkage,
            final_cluster,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    fn ensure_matrix(&mut self, progress: &dyn MatrixProgress) {
        if self.matrix_ready {
            return;
        }

        debug!("Calculating distance matrix for {} clusters", self.prototypes.len());
        self.matrix = match &self.pool {
            Some(pool) => {
                let prototypes = &self.prototypes;
                pool.install(|| DistanceMatrix::build_parallel(prototypes, progress))
            },
            None => DistanceMatrix::build(&self.prototypes, progress),
        };
        self.matrix_ready = true;
    }
}

/// Clusters `table` to completion without any reporting.
pub fn agglomerate<T: AttributeTable + ?Sized>(
    table: &T,
    config: &ClusterConfig,
) -> Result<ClusteringOutcome> {
    MergeEngine::new(table, config)?.run(&mut SilentObserver)
}
