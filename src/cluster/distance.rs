// src/cluster/distance.rs
use rayon::prelude::*;
use log::trace;

use crate::table::AttributeTable;
use super::prototype::{euclidean, mean_vector};
use super::types::Cluster;

/// Receives row-completion updates while a distance matrix is built.
///
/// Rows may complete on several rayon workers at once, hence `&self`.
pub trait MatrixProgress: Sync {
    fn begin(&self, _rows: usize) {}
    fn rows_done(&self, _rows: usize) {}
    fn finish(&self) {}
}

/// Progress sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl MatrixProgress for NoProgress {}

/// Square symmetric matrix of Euclidean distances between cluster
/// prototypes, indexed by position in the cluster list.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl DistanceMatrix {
    /// Sequential build; progress advances once per finished row.
    pub fn build(prototypes: &[Vec<f64>], progress: &dyn MatrixProgress) -> Self {
        let size = prototypes.len();
        let mut cells = vec![0.0; size * size];
        progress.begin(size);

        for i in 0..size {
            // Only the upper half is computed, the lower half is mirrored
            for j in (i + 1)..size {
                let d = euclidean(&prototypes[i], &prototypes[j]);
                cells[i * size + j] = d;
                cells[j * size + i] = d;
            }
            progress.rows_done(1);
        }

        progress.finish();
        Self { size, cells }
    }

    /// Builds rows on the current rayon pool. The result is identical to
    /// [`build`](Self::build).
    pub fn build_parallel(prototypes: &[Vec<f64>], progress: &dyn MatrixProgress) -> Self {
        let size = prototypes.len();
        progress.begin(size);

        let upper: Vec<Vec<f64>> = (0..size)
            .into_par_iter()
            .map(|i| {
                let row: Vec<f64> = ((i + 1)..size)
                    .map(|j| euclidean(&prototypes[i], &prototypes[j]))
                    .collect();
                progress.rows_done(1);
                row
            })
            .collect();

        let mut cells = vec![0.0; size * size];
        for (i, row) in upper.iter().enumerate() {
            for (offset, &d) in row.iter().enumerate() {
                let j = i + 1 + offset;
                cells[i * size + j] = d;
                cells[j * size + i] = d;
            }
        }

        progress.finish();
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[i * self.size + j]
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| {
            self.get(i, i) == 0.0 && ((i + 1)..self.size).all(|j| self.get(i, j) == self.get(j, i))
        })
    }

    /// Closest pair `(c1, c2, distance)` with `c1 < c2`.
    ///
    /// The upper triangle is scanned row-major and only a strictly smaller
    /// distance replaces the current best, so ties go to the lowest `c1`
    /// and then the lowest `c2`. Returns `None` below two clusters.
    pub fn nearest_pair(&self) -> Option<(usize, usize, f64)> {
        if self.size < 2 {
            return None;
        }

        let mut best: Option<(usize, usize, f64)> = None;
        let mut min_distance = f64::INFINITY;
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                let d = self.get(i, j);
                if d < min_distance {
                    min_distance = d;
                    best = Some((i, j, d));
                }
            }
        }

        // Every distance infinite or NaN
        best.or_else(|| Some((0, 1, self.get(0, 1))))
    }

    /// Matrix for the list with `c1` and `c2` removed and the merged
    /// cluster appended. `merged_row` holds the merged cluster's distances
    /// to the remaining clusters in their new order.
    pub fn merged(&self, c1: usize, c2: usize, merged_row: &[f64]) -> Self {
        let kept: Vec<usize> = (0..self.size).filter(|&i| i != c1 && i != c2).collect();
        debug_assert_eq!(kept.len(), merged_row.len());

        let size = kept.len() + 1;
        let last = size - 1;
        let mut cells = vec![0.0; size * size];
        for (a, &old_a) in kept.iter().enumerate() {
            for (b, &old_b) in kept.iter().enumerate() {
                cells[a * size + b] = self.get(old_a, old_b);
            }
            cells[a * size + last] = merged_row[a];
            cells[last * size + a] = merged_row[a];
        }

        trace!("Incremental matrix update: {} -> {} clusters", self.size, size);
        Self { size, cells }
    }
}

/// Prototype vectors of `clusters`, in list order.
pub fn cluster_prototypes<T: AttributeTable + ?Sized>(clusters: &[Cluster], table: &T) -> Vec<Vec<f64>> {
    clusters.iter().map(|c| mean_vector(&c.members, table)).collect()
}

/// Distance matrix straight from a cluster list.
pub fn build_distance_matrix<T: AttributeTable + ?Sized>(
    clusters: &[Cluster],
    table: &T,
    progress: &dyn MatrixProgress,
) -> DistanceMatrix {
    DistanceMatrix::build(&cluster_prototypes(clusters, table), progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::table::Table;

    #[derive(Default)]
    struct CountingProgress {
        begun: AtomicUsize,
        rows: AtomicUsize,
        finished: AtomicUsize,
    }

    impl MatrixProgress for CountingProgress {
        fn begin(&self, rows: usize) {
            self.begun.store(rows, Ordering::SeqCst);
        }
        fn rows_done(&self, rows: usize) {
            self.rows.fetch_add(rows, Ordering::SeqCst);
        }
        fn finish(&self) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn points() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![3.0, 4.0],
            vec![6.0, 8.0],
            vec![-1.0, 2.5],
            vec![0.5, 0.5],
        ]
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        let m = DistanceMatrix::build(&points(), &NoProgress);
        assert_eq!(m.size(), 5);
        assert!(m.is_symmetric());
        assert_eq!(m.get(0, 1), 5.0);
        assert_eq!(m.get(2, 0), 10.0);
        assert!((0..5).all(|i| (0..5).all(|j| m.get(i, j) >= 0.0)));
    }

    #[test]
    fn progress_counts_every_row() {
        let progress = CountingProgress::default();
        DistanceMatrix::build(&points(), &progress);
        assert_eq!(progress.begun.load(Ordering::SeqCst), 5);
        assert_eq!(progress.rows.load(Ordering::SeqCst), 5);
        assert_eq!(progress.finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn parallel_build_matches_sequential() {
        let pts: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![(i as f64 * 0.37).sin(), (i as f64 * 1.3).cos() * 7.0, i as f64 / 3.0])
            .collect();
        let progress = CountingProgress::default();
        let parallel = DistanceMatrix::build_parallel(&pts, &progress);
        assert_eq!(parallel, DistanceMatrix::build(&pts, &NoProgress));
        assert_eq!(progress.rows.load(Ordering::SeqCst), 40);
    }

    #[test]
    fn nearest_pair_prefers_first_in_row_major_order() {
        // d(0,1) = d(2,3) = 1, every other pair is further apart
        let m = DistanceMatrix::build(
            &[vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 10.0], vec![10.0, 11.0]],
            &NoProgress,
        );
        assert_eq!(m.nearest_pair(), Some((0, 1, 1.0)));

        // Equal minima in the same row: lowest c2 wins
        let m = DistanceMatrix::build(&[vec![0.0], vec![1.0], vec![-1.0]], &NoProgress);
        assert_eq!(m.nearest_pair(), Some((0, 1, 1.0)));
    }

    #[test]
    fn nearest_pair_needs_two_clusters() {
        let m = DistanceMatrix::build(&[vec![1.0]], &NoProgress);
        assert_eq!(m.nearest_pair(), None);
    }

    #[test]
    fn merged_matches_a_fresh_build() {
        let pts = points();
        let m = DistanceMatrix::build(&pts, &NoProgress);

        // Merge positions 1 and 3, new cluster goes last
        let merged_point = vec![(3.0 - 1.0) / 2.0, (4.0 + 2.5) / 2.0];
        let mut after: Vec<Vec<f64>> = vec![pts[0].clone(), pts[2].clone(), pts[4].clone()];
        let row: Vec<f64> = after.iter().map(|p| euclidean(p, &merged_point)).collect();
        after.push(merged_point);

        assert_eq!(m.merged(1, 3, &row), DistanceMatrix::build(&after, &NoProgress));
    }

    #[test]
    fn builds_from_clusters() {
        let table = Table::from_rows(&["x"], vec![vec![0.0], vec![2.0], vec![10.0]]).unwrap();
        let clusters = vec![Cluster::new(0, vec![0, 1]), Cluster::new(2, vec![2])];
        let m = build_distance_matrix(&clusters, &table, &NoProgress);
        assert_eq!(m.get(0, 1), 9.0);
    }
}
