// src/config/subsystems/cluster.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::{FromIni, parse_bool};

/// Default number of merge records kept by the history tracker.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// How the distance matrix follows a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RebuildStrategy {
    /// Recompute every cell from fresh prototypes.
    Full,
    /// Drop the merged rows/columns and append one row for the new cluster.
    Incremental,
}

impl RebuildStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RebuildStrategy::Full => "full",
            RebuildStrategy::Incremental => "incremental",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim_matches('"').trim().to_lowercase().as_str() {
            "full" => Some(Self::Full),
            "incremental" | "incr" => Some(Self::Incremental),
            _ => None,
        }
    }
}

impl Default for RebuildStrategy {
    fn default() -> Self {
        Self::Incremental
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub history_capacity: usize,
    pub rebuild: RebuildStrategy,

    // Parallel distance matrix construction
    pub parallel: bool,
    // 0 uses rayon's global pool
    pub thread_count: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            rebuild: RebuildStrategy::default(),
            parallel: false,
            thread_count: 0,
        }
    }
}

impl FromIni for ClusterConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "cluster" {
            return None;
        }

        match key {
            "history_capacity" => Some(match value.parse() {
                Ok(capacity) if capacity > 0 => {
                    self.history_capacity = capacity;
                    Ok(())
                },
                _ => Err(Error::Config(
                    format!("Invalid history_capacity (must be > 0): {}", value)
                )),
            }),
            "rebuild" => Some(match RebuildStrategy::from_str(value) {
                Some(strategy) => {
                    self.rebuild = strategy;
                    Ok(())
                },
                None => Err(Error::Config(
                    format!("Invalid rebuild (must be 'full' or 'incremental'): {}", value)
                )),
            }),
            "parallel" => Some(match parse_bool(value) {
                Some(parallel) => {
                    self.parallel = parallel;
                    Ok(())
                },
                None => Err(Error::Config(format!("Invalid boolean for parallel: {}", value))),
            }),
            "thread_count" => Some(match value.parse() {
                Ok(count) => {
                    self.thread_count = count;
                    Ok(())
                },
                Err(_) => Err(Error::Config(format!("Invalid thread_count: {}", value))),
            }),
            _ => None,
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(Error::Config(
                "history_capacity must be greater than 0".to_string()
            ));
        }

        let cpus = num_cpus::get();
        if self.thread_count > cpus * 4 {
            log::warn!(
                "thread_count ({}) is far above the available CPUs ({})",
                self.thread_count,
                cpus
            );
        }
        if self.thread_count > 0 && !self.parallel {
            log::warn!("thread_count is set but parallel is disabled; it will be ignored");
        }
        Ok(())
    }

    /// Number of worker threads the matrix build will use.
    pub fn effective_threads(&self) -> usize {
        if !self.parallel {
            1
        } else if self.thread_count == 0 {
            num_cpus::get()
        } else {
            self.thread_count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_runs_use_one_thread() {
        let config = ClusterConfig { thread_count: 8, ..ClusterConfig::default() };
        assert_eq!(config.effective_threads(), 1);
    }

    #[test]
    fn parallel_threads_default_to_cpu_count() {
        let mut config = ClusterConfig { parallel: true, ..ClusterConfig::default() };
        config.thread_count = 0;
        assert_eq!(config.effective_threads(), num_cpus::get());
        config.thread_count = 3;
        assert_eq!(config.effective_threads(), 3);
    }

    #[test]
    fn zero_history_capacity_fails_validation() {
        let config = ClusterConfig { history_capacity: 0, ..ClusterConfig::default() };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
