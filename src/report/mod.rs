//! Text and file reports for a finished run.

pub mod progress;

use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use chrono::Local;
use serde::Serialize;
use log::info;

use crate::cluster::{ClusteringOutcome, MergeRecord};
use crate::config::AgglomConfig;
use crate::correlation::CorrelationSummary;
use crate::error::Result;

pub use progress::ConsoleObserver;

/// Contents of `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub generated_at: String,
    pub rows_loaded: usize,
    pub rows_clustered: usize,
    pub merges: usize,
    pub history_capacity: usize,
    pub history: Vec<MergeRecord>,
    pub terminal: Option<MergeRecord>,
    pub correlation: Option<CorrelationSummary>,
}

impl RunSummary {
    pub fn new(
        input: &Path,
        rows_loaded: usize,
        outcome: &ClusteringOutcome,
        correlation: Option<CorrelationSummary>,
    ) -> Self {
        Self {
            input: input.to_path_buf(),
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            rows_loaded,
            rows_clustered: outcome.rows,
            merges: outcome.merges,
            history_capacity: outcome.history.capacity(),
            history: outcome.history.entries().cloned().collect(),
            terminal: outcome.terminal.clone(),
            correlation,
        }
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        info!("Wrote run summary to {:?}", path.as_ref());
        Ok(())
    }
}

/// Final report: sizes of the retained smaller clusters, oldest first,
/// then their prototypes one per line.
pub fn final_report(outcome: &ClusteringOutcome) -> String {
    let capacity = outcome.history.capacity();
    let mut out = String::new();
    let _ = writeln!(out, "Sizes of last {} smallest merged clusters:", capacity);
    let _ = writeln!(out, "{:?}", outcome.history.sizes());
    let _ = writeln!(out, "Prototypes of last {} smallest merged clusters:", capacity);
    for record in outcome.history.entries() {
        let _ = writeln!(out, "{}", record.prototype);
    }
    out
}

/// Writes the configured artifacts into `files.output_dir` and returns
/// their paths.
pub fn write_artifacts(config: &AgglomConfig, summary: &RunSummary, outcome: &ClusteringOutcome) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    std::fs::create_dir_all(&config.files.output_dir)?;

    if config.report.write_linkage {
        let path = config.files.output_dir.join("linkage.csv");
        outcome.linkage.write_csv_file(&path)?;
        written.push(path);
    }
    if config.report.write_summary {
        let path = config.files.output_dir.join("summary.json");
        summary.write_json(&path)?;
        written.push(path);
    }
    Ok(written)
}
