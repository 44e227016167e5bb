// src/config/subsystems/correlation.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::{FromIni, parse_bool};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationConfig {
    pub enabled: bool,
    // Decimal places the matrix is rounded to before the summary scans
    pub decimals: u32,
    // Attributes whose strongest positive correlation stays below this are reported
    pub irrelevance_threshold: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            decimals: 2,
            irrelevance_threshold: 0.1,
        }
    }
}

impl FromIni for CorrelationConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "correlation" {
            return None;
        }

        match key {
            "enabled" => Some(match parse_bool(value) {
                Some(enabled) => {
                    self.enabled = enabled;
                    Ok(())
                },
                None => Err(Error::Config(format!("Invalid boolean for enabled: {}", value))),
            }),
            "decimals" => Some(match value.parse() {
                Ok(decimals) => {
                    self.decimals = decimals;
                    Ok(())
                },
                Err(_) => Err(Error::Config(format!("Invalid decimals: {}", value))),
            }),
            "irrelevance_threshold" => Some(match value.parse::<f64>() {
                Ok(threshold) if threshold.is_finite() => {
                    self.irrelevance_threshold = threshold;
                    Ok(())
                },
                _ => Err(Error::Config(
                    format!("Invalid irrelevance_threshold: {}", value)
                )),
            }),
            _ => None,
        }
    }
}

impl CorrelationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.decimals > 15 {
            return Err(Error::Config(
                format!("decimals ({}) cannot exceed 15", self.decimals)
            ));
        }
        if !(-1.0..=1.0).contains(&self.irrelevance_threshold) {
            return Err(Error::Config(
                format!("irrelevance_threshold ({}) must lie in [-1, 1]", self.irrelevance_threshold)
            ));
        }
        Ok(())
    }
}
