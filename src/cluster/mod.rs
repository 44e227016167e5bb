//! Prototype-based agglomerative clustering.
//!
//! Each row starts as its own cluster. [`MergeEngine`] repeatedly merges
//! the two clusters whose prototypes (per-attribute means) are closest in
//! Euclidean distance until a single cluster is left, keeping a bounded
//! history of the smaller side of each merge and the full linkage for
//! dendrogram rendering.
//!
//! The work is cubic in the number of rows; callers bound large inputs
//! with a row limit before clustering.

pub mod distance;
pub mod engine;
pub mod history;
pub mod linkage;
pub mod prototype;
pub mod types;

pub use distance::{build_distance_matrix, DistanceMatrix, MatrixProgress, NoProgress};
pub use engine::{agglomerate, ClusteringOutcome, MergeEngine, MergeObserver, SilentObserver};
pub use history::MergeHistory;
pub use linkage::{Linkage, LinkageRow};
pub use prototype::{prototype, Prototype};
pub use types::{Cluster, EngineState, MergeEvent, MergeRecord};
