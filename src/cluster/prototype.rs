// src/cluster/prototype.rs
use std::fmt;
use std::sync::Arc;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::table::AttributeTable;

/// Per-attribute mean of a cluster's member rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    columns: Arc<[String]>,
    values: Vec<f64>,
}

impl Prototype {
    pub fn new(columns: Arc<[String]>, values: Vec<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn get(&self, attribute: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == attribute)
            .map(|i| self.values[i])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns.iter().map(String::as_str).zip(self.values.iter().copied())
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}': {:?}", name, value)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for Prototype {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Mean of every attribute over `members`, summed in member order.
///
/// `members` must be non-empty; an empty cluster never exists while the
/// engine runs.
pub fn mean_vector<T: AttributeTable + ?Sized>(members: &[usize], table: &T) -> Vec<f64> {
    debug_assert!(!members.is_empty(), "prototype of an empty cluster");
    let count = members.len() as f64;
    (0..table.column_count())
        .map(|column| {
            let sum: f64 = members.iter().map(|&row| table.value(row, column)).sum();
            sum / count
        })
        .collect()
}

pub fn prototype<T: AttributeTable + ?Sized>(members: &[usize], table: &T) -> Prototype {
    Prototype::new(table.shared_columns(), mean_vector(members, table))
}

/// Euclidean distance between two attribute vectors of equal length.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    #[test]
    fn singleton_prototype_is_the_row() {
        let table = Table::from_rows(&["a", "b", "c"], vec![
            vec![0.1, -2.0, 7.25],
            vec![9.0, 9.0, 9.0],
        ]).unwrap();
        let p = prototype(&[0], &table);
        assert_eq!(p.values(), table.row(0));
        assert_eq!(p.get("c"), Some(7.25));
        assert_eq!(p.get("missing"), None);
    }

    #[test]
    fn identical_rows_give_their_common_value() {
        let row = vec![0.3, 1.7];
        let table = Table::from_rows(&["x", "y"], vec![row.clone(); 5]).unwrap();
        let p = prototype(&[0, 1, 2, 3, 4], &table);
        for (value, expected) in p.values().iter().zip(&row) {
            assert!((value - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn mean_is_per_attribute() {
        let table = Table::from_rows(&["x", "y"], vec![
            vec![0.0, 10.0],
            vec![2.0, 20.0],
            vec![100.0, 100.0],
        ]).unwrap();
        let p = prototype(&[1, 0], &table);
        assert_eq!(p.values(), &[1.0, 15.0]);
    }

    #[test]
    fn display_reads_like_a_mapping() {
        let table = Table::from_rows(&["Milk", "Eggs"], vec![vec![1.0, 2.5]]).unwrap();
        assert_eq!(prototype(&[0], &table).to_string(), "{'Milk': 1.0, 'Eggs': 2.5}");
    }

    #[test]
    fn serializes_as_object() {
        let table = Table::from_rows(&["a", "b"], vec![vec![1.0, 2.0]]).unwrap();
        let json = serde_json::to_string(&prototype(&[0], &table)).unwrap();
        assert_eq!(json, r#"{"a":1.0,"b":2.0}"#);
    }

    #[test]
    fn euclidean_distance() {
        assert_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(euclidean(&[1.5, -2.0], &[1.5, -2.0]), 0.0);
    }
}
