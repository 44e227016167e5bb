pub mod file;
pub mod subsystems;

use serde::{Serialize, Deserialize};
use std::path::Path;
use std::fs;
use crate::error::Result;
use log::{warn, trace};

pub trait FromIni {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgglomConfig {
    // File paths
    pub files: file::FileConfig,

    // Subsystem configs
    pub loader: subsystems::LoaderConfig,
    pub cluster: subsystems::ClusterConfig,
    pub correlation: subsystems::CorrelationConfig,
    pub report: subsystems::ReportConfig,
}

impl AgglomConfig {
    pub fn validate(&self) -> Result<()> {
        self.files.validate()?;
        self.loader.validate()?;
        self.cluster.validate()?;
        self.correlation.validate()?;
        self.report.validate()?;
        Ok(())
    }

    pub fn from_ini<P: AsRef<Path>>(path: P) -> Result<Self> {
        let absolute_path = std::fs::canonicalize(&path)
            .unwrap_or_else(|_| path.as_ref().to_path_buf());

        trace!("Loading configuration from: {:?}", absolute_path);

        let content = fs::read_to_string(&path)?;
        Self::from_ini_str(&content)
    }

    /// Parses INI text on top of the defaults. Invalid values for known
    /// keys are errors; unknown keys only produce a warning.
    pub fn from_ini_str(content: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut current_section = String::new();

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = line[1..line.len()-1].trim().to_string();
                trace!("  Line {}: Found section: [{}]", line_num + 1, current_section);
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                // Delegate to appropriate subsystem config
                match match current_section.as_str() {
                    "file" => config.files.from_ini_section(&current_section, key, value),
                    "loader" => config.loader.from_ini_section(&current_section, key, value),
                    "cluster" => config.cluster.from_ini_section(&current_section, key, value),
                    "correlation" => config.correlation.from_ini_section(&current_section, key, value),
                    "report" => config.report.from_ini_section(&current_section, key, value),
                    _ => None,
                } {
                    Some(result) => result?,
                    None => warn!(
                        "Unrecognized config key: {}={} in section [{}]",
                        key, value, current_section
                    ),
                }
            } else {
                warn!("Ignoring malformed config line {}: {}", line_num + 1, line);
            }
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parses the boolean spellings accepted in INI files.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim_matches('"').to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::subsystems::cluster::RebuildStrategy;
    use crate::error::Error;

    #[test]
    fn empty_ini_yields_defaults() {
        let config = AgglomConfig::from_ini_str("").unwrap();
        assert_eq!(config.cluster.history_capacity, 20);
        assert_eq!(config.correlation.decimals, 2);
        assert_eq!(config.loader.row_limit, None);
        assert_eq!(config.cluster.rebuild, RebuildStrategy::Incremental);
    }

    #[test]
    fn sections_route_to_subsystems() {
        let ini = r#"
            # comment
            [file]
            output_dir = "results"

            [loader]
            row_limit = 100
            delimiter = ;

            [cluster]
            parallel = true
            thread_count = 3
            rebuild = full

            [correlation]
            irrelevance_threshold = 0.2

            [report]
            log_level = debug
            show_progress = no
        "#;
        let config = AgglomConfig::from_ini_str(ini).unwrap();
        assert_eq!(config.files.output_dir, std::path::PathBuf::from("results"));
        assert_eq!(config.loader.row_limit, Some(100));
        assert_eq!(config.loader.delimiter, b';');
        assert!(config.cluster.parallel);
        assert_eq!(config.cluster.thread_count, 3);
        assert_eq!(config.cluster.rebuild, RebuildStrategy::Full);
        assert!((config.correlation.irrelevance_threshold - 0.2).abs() < 1e-12);
        assert_eq!(config.report.get_log_level(), log::LevelFilter::Debug);
        assert!(!config.report.show_progress);
    }

    #[test]
    fn invalid_value_is_rejected() {
        let err = AgglomConfig::from_ini_str("[cluster]\nhistory_capacity = zero\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn zero_row_limit_is_rejected() {
        let err = AgglomConfig::from_ini_str("[loader]\nrow_limit = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let mut config = AgglomConfig::default();
        config.loader.row_limit = Some(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = AgglomConfig::from_ini_str("[cluster]\ncolour = blue\n[mystery]\na = b\n").unwrap();
        assert_eq!(config.cluster.history_capacity, 20);
    }

    #[test]
    fn from_ini_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agglom.ini");
        fs::write(&path, "[loader]\nrow_limit = 7\n").unwrap();
        let config = AgglomConfig::from_ini(&path).unwrap();
        assert_eq!(config.loader.row_limit, Some(7));
    }
}
