// src/correlation/summary.rs
use std::fmt;
use serde::Serialize;

use super::CorrelationMatrix;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributePair {
    pub first: String,
    pub second: String,
    pub value: f64,
}

/// Highlights of a (usually rounded) correlation matrix.
///
/// NaN cells never win a comparison and add nothing to the absolute sums.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationSummary {
    /// Largest off-diagonal coefficient, first in row-major order on ties
    pub most_positive: Option<AttributePair>,
    /// Smallest off-diagonal coefficient, first in row-major order on ties
    pub most_negative: Option<AttributePair>,
    /// The two attributes with the smallest sum of absolute coefficients
    pub least_correlated: Option<(String, String)>,
    /// Attributes whose strongest positive coefficient stays under the threshold
    pub possibly_irrelevant: Vec<(String, f64)>,
}

// Running extreme of a row-major scan
struct Extreme {
    value: f64,
    cell: Option<(usize, usize)>,
}

impl Extreme {
    fn offer(&mut self, value: f64, cell: (usize, usize), better: impl Fn(f64, f64) -> bool) {
        if better(value, self.value) {
            self.value = value;
            self.cell = Some(cell);
        }
    }

    fn into_pair(self, columns: &[String]) -> Option<AttributePair> {
        self.cell.map(|(i, j)| AttributePair {
            first: columns[i].clone(),
            second: columns[j].clone(),
            value: self.value,
        })
    }
}

impl CorrelationSummary {
    pub fn from_matrix(matrix: &CorrelationMatrix, irrelevance_threshold: f64) -> Self {
        let size = matrix.size();
        let columns = matrix.columns();

        let mut most = Extreme { value: -1.0, cell: None };
        let mut least = Extreme { value: 1.0, cell: None };
        let mut totals: Vec<(usize, f64)> = Vec::with_capacity(size);

        for i in 0..size {
            let mut total = 0.0;
            for j in 0..size {
                let value = matrix.get(i, j);
                if !value.is_nan() {
                    total += value.abs();
                }
                if i != j {
                    most.offer(value, (i, j), |v, best| v > best);
                    least.offer(value, (i, j), |v, best| v < best);
                }
            }
            totals.push((i, total));
        }

        // Stable, so equal totals keep column order
        totals.sort_by(|a, b| a.1.total_cmp(&b.1));
        let least_correlated = match totals.as_slice() {
            [first, second, ..] => Some((columns[first.0].clone(), columns[second.0].clone())),
            _ => None,
        };

        let possibly_irrelevant = (0..size)
            .filter_map(|i| {
                let strongest = (0..size)
                    .filter(|&j| j != i)
                    .map(|j| matrix.get(i, j))
                    .fold(0.0, |max, v| if v > max { v } else { max });
                (strongest < irrelevance_threshold).then(|| (columns[i].clone(), strongest))
            })
            .collect();

        Self {
            most_positive: most.into_pair(columns),
            most_negative: least.into_pair(columns),
            least_correlated,
            possibly_irrelevant,
        }
    }
}

impl fmt::Display for CorrelationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pair) = &self.most_positive {
            writeln!(
                f,
                "The two attributes with the most positive cross-correlation are {} and {} at {:?}.",
                pair.first, pair.second, pair.value
            )?;
        }
        if let Some(pair) = &self.most_negative {
            writeln!(
                f,
                "The two attributes with the most negative cross-correlation are {} and {} at {:?}.",
                pair.first, pair.second, pair.value
            )?;
        }
        if let Some((first, second)) = &self.least_correlated {
            writeln!(f, "The two least correlated attributes are {} and {}.", first, second)?;
        }
        for (name, value) in &self.possibly_irrelevant {
            writeln!(f, "{} has a maximum absolute correlation value of {:?}.", name, value)?;
        }
        Ok(())
    }
}
