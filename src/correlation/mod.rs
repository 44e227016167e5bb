//! Pairwise Pearson correlation between table attributes.
//!
//! Runs on the full table independently of the clustering engine.

pub mod summary;

use std::fmt;
use serde::Serialize;
use log::debug;

use crate::table::AttributeTable;

pub use summary::{AttributePair, CorrelationSummary};

/// Square matrix of Pearson coefficients, indexed like the table's columns.
///
/// A constant column has no defined correlation; its cells are NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    cells: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn compute<T: AttributeTable + ?Sized>(table: &T) -> Self {
        let columns = table.columns().to_vec();
        let size = columns.len();
        let series: Vec<Vec<f64>> = (0..size).map(|c| table.column_values(c)).collect();

        let mut cells = vec![f64::NAN; size * size];
        for i in 0..size {
            for j in i..size {
                let r = if i == j {
                    if variance(&series[i]) > 0.0 { 1.0 } else { f64::NAN }
                } else {
                    pearson(&series[i], &series[j])
                };
                cells[i * size + j] = r;
                cells[j * size + i] = r;
            }
        }

        debug!("Computed {}x{} correlation matrix over {} rows", size, size, table.row_count());
        Self { columns, cells }
    }

    /// Copy with every cell rounded half-to-even to `decimals` places.
    pub fn rounded(&self, decimals: u32) -> Self {
        let scale = 10f64.powi(decimals as i32);
        Self {
            columns: self.columns.clone(),
            cells: self.cells.iter().map(|v| (v * scale).round_ties_even() / scale).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[i * self.columns.len() + j]
    }
}

impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(2);
        let label_width = self.columns.iter().map(String::len).max().unwrap_or(0);
        let cell = |v: f64| if v.is_nan() { "NaN".to_string() } else { format!("{:.*}", precision, v) };
        let widths: Vec<usize> = (0..self.size())
            .map(|j| {
                (0..self.size())
                    .map(|i| cell(self.get(i, j)).len())
                    .chain(std::iter::once(self.columns[j].len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:label_width$}", "")?;
        for (name, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", name, width = *width)?;
        }
        for i in 0..self.size() {
            writeln!(f)?;
            write!(f, "{:<label_width$}", self.columns[i])?;
            for (j, width) in widths.iter().enumerate() {
                write!(f, "  {:>width$}", cell(self.get(i, j)), width = *width)?;
            }
        }
        Ok(())
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum()
}

/// Pearson correlation coefficient; NaN when either series is constant or
/// shorter than two values.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);
    let (covariance, var_x, var_y) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0, 0.0), |(cov, vx, vy), (&xi, &yi)| {
            let dx = xi - mean_x;
            let dy = yi - mean_y;
            (cov + dx * dy, vx + dx * dx, vy + dy * dy)
        });

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }

    (covariance / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}
