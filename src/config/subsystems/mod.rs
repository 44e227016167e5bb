pub mod loader;
pub mod cluster;
pub mod correlation;
pub mod report;

pub use loader::LoaderConfig;
pub use cluster::ClusterConfig;
pub use correlation::CorrelationConfig;
pub use report::ReportConfig;
