// src/config/subsystems/report.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::{FromIni, parse_bool};
use log::LevelFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub show_progress: bool,
    pub write_linkage: bool,
    pub write_summary: bool,

    // Log level
    pub log_level: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            write_linkage: true,
            write_summary: true,
            log_level: "info".to_string(),
        }
    }
}

impl FromIni for ReportConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "report" {
            return None;
        }

        let flag = |value: &str, name: &str| -> Result<bool> {
            parse_bool(value).ok_or_else(|| Error::Config(format!("Invalid boolean for {}: {}", name, value)))
        };

        match key {
            "show_progress" => Some(flag(value, key).map(|v| self.show_progress = v)),
            "write_linkage" => Some(flag(value, key).map(|v| self.write_linkage = v)),
            "write_summary" => Some(flag(value, key).map(|v| self.write_summary = v)),
            "log_level" => Some(self.set_log_level(value)),
            _ => None,
        }
    }
}

impl ReportConfig {
    pub fn set_log_level(&mut self, value: &str) -> Result<()> {
        let level = value.trim_matches('"').trim().to_lowercase();
        match level.as_str() {
            "none" | "error" | "warn" | "info" | "debug" | "trace" => {
                self.log_level = level;
                Ok(())
            },
            _ => Err(Error::Config(
                format!("Invalid log level '{}'. Must be one of: none, error, warn, info, debug, trace", value)
            )),
        }
    }

    pub fn get_log_level(&self) -> LevelFilter {
        match self.log_level.trim().to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            "none" => LevelFilter::Off,
            _ => LevelFilter::Info, // Default to Info if invalid
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.log_level.as_str() {
            "none" | "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => Err(Error::Config(format!("Invalid log level '{}'", other))),
        }
    }
}
