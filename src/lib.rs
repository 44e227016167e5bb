//! agglom is a library for exploratory analysis of numeric tables.
//! It reports pairwise attribute correlations and clusters rows
//! agglomeratively by merging the two clusters with the closest
//! prototypes (per-attribute means) until one cluster remains.

// Module declarations
pub mod error;
pub mod config;
pub mod table;
pub mod cluster;
pub mod correlation;
pub mod report;

// Re-exports
pub use error::{Error, Result};
pub use table::{AttributeTable, CsvLoader, Table};
pub use cluster::{agglomerate, ClusteringOutcome, MergeEngine, MergeObserver};
pub use correlation::{CorrelationMatrix, CorrelationSummary};

// Re-export the config from config module
pub use config::AgglomConfig;
