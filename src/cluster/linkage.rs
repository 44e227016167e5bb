// src/cluster/linkage.rs
use std::io::Write;
use std::path::Path;
use serde::Serialize;
use log::info;

use crate::error::{Error, Result};
use super::types::MergeEvent;

/// One merge in dendrogram form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkageRow {
    pub step: usize,
    pub left_id: usize,
    pub right_id: usize,
    pub distance: f64,
    pub size: usize,
}

/// The full merge sequence, enough for an external renderer to draw the
/// dendrogram. Leaves are the original rows `0..leaves`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Linkage {
    leaves: usize,
    rows: Vec<LinkageRow>,
}

impl Linkage {
    pub fn new(leaves: usize) -> Self {
        Self {
            leaves,
            rows: Vec::with_capacity(leaves.saturating_sub(1)),
        }
    }

    pub fn push(&mut self, event: &MergeEvent) {
        let (a, b) = event.cluster_ids;
        self.rows.push(LinkageRow {
            step: event.step,
            left_id: a.min(b),
            right_id: a.max(b),
            distance: event.distance,
            size: event.merged_size,
        });
    }

    pub fn leaves(&self) -> usize {
        self.leaves
    }

    pub fn rows(&self) -> &[LinkageRow] {
        &self.rows
    }

    pub fn is_complete(&self) -> bool {
        self.rows.len() + 1 == self.leaves
    }

    /// Checks that every id refers to a leaf or an earlier merge, is used
    /// once, and that sizes add up.
    pub fn validate(&self) -> Result<()> {
        let total = self.leaves + self.rows.len();
        let mut sizes = vec![1usize; self.leaves];
        sizes.resize(total, 0);
        let mut used = vec![false; total];

        for (step, row) in self.rows.iter().enumerate() {
            let new_id = self.leaves + step;
            for id in [row.left_id, row.right_id] {
                if id >= new_id {
                    return Err(Error::data(format!(
                        "linkage step {} refers to cluster {} before it exists",
                        step, id
                    )));
                }
                if used[id] {
                    return Err(Error::data(format!(
                        "linkage step {} merges cluster {} a second time",
                        step, id
                    )));
                }
                used[id] = true;
            }
            let expected = sizes[row.left_id] + sizes[row.right_id];
            if row.size != expected {
                return Err(Error::data(format!(
                    "linkage step {} has size {}, expected {}",
                    step, row.size, expected
                )));
            }
            sizes[new_id] = expected;
        }
        Ok(())
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_csv_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))?;
        info!("Wrote {} linkage rows to {:?}", self.rows.len(), path);
        Ok(())
    }
}
