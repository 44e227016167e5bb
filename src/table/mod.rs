//! In-memory numeric tables and the CSV loader that produces them.
//!
//! The clustering engine and the correlation analysis only see the
//! [`AttributeTable`] trait, so any row-indexed numeric source can be
//! clustered.

pub mod csv_loader;

use std::sync::Arc;
use crate::error::{Error, Result};

pub use csv_loader::CsvLoader;

/// Read-only view of a table of numeric attributes indexed by row.
pub trait AttributeTable {
    fn row_count(&self) -> usize;

    /// Attribute names in column order.
    fn columns(&self) -> &[String];

    /// Value of `column` (an index into [`columns`](Self::columns)) for `row`.
    fn value(&self, row: usize, column: usize) -> f64;

    fn column_count(&self) -> usize {
        self.columns().len()
    }

    fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    fn column_values(&self, column: usize) -> Vec<f64> {
        (0..self.row_count()).map(|row| self.value(row, column)).collect()
    }

    /// Column names as a shared handle, kept by every prototype.
    fn shared_columns(&self) -> Arc<[String]> {
        self.columns().to_vec().into()
    }
}

/// Row-major table of attribute values with a separate row identifier column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    id_column: String,
    ids: Vec<String>,
    columns: Arc<[String]>,
    values: Vec<f64>,
}

impl Table {
    /// Builds a table from explicit rows. Every row must have one value per column.
    pub fn new(
        id_column: impl Into<String>,
        columns: Vec<String>,
        ids: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if ids.len() != rows.len() {
            return Err(Error::data(format!(
                "{} row ids supplied for {} rows",
                ids.len(),
                rows.len()
            )));
        }

        let width = columns.len();
        let mut values = Vec::with_capacity(rows.len() * width);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(Error::data(format!(
                    "row {} has {} values, expected {}",
                    index,
                    row.len(),
                    width
                )));
            }
            values.extend(row);
        }

        Ok(Self {
            id_column: id_column.into(),
            ids,
            columns: columns.into(),
            values,
        })
    }

    /// Convenience constructor with ids `0..n`, used mostly by tests.
    pub fn from_rows(columns: &[&str], rows: Vec<Vec<f64>>) -> Result<Self> {
        let ids = (0..rows.len()).map(|i| i.to_string()).collect();
        Self::new(
            "id",
            columns.iter().map(|c| c.to_string()).collect(),
            ids,
            rows,
        )
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let width = self.columns.len();
        &self.values[row * width..(row + 1) * width]
    }

    /// The first `limit` rows, or the whole table when it is shorter.
    pub fn head(&self, limit: usize) -> Table {
        let rows = limit.min(self.ids.len());
        Table {
            id_column: self.id_column.clone(),
            ids: self.ids[..rows].to_vec(),
            columns: Arc::clone(&self.columns),
            values: self.values[..rows * self.columns.len()].to_vec(),
        }
    }
}

impl AttributeTable for Table {
    fn row_count(&self) -> usize {
        self.ids.len()
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn value(&self, row: usize, column: usize) -> f64 {
        self.values[row * self.columns.len() + column]
    }

    fn shared_columns(&self) -> Arc<[String]> {
        Arc::clone(&self.columns)
    }
}
