// src/config/subsystems/loader.rs

use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::{FromIni, parse_bool};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    // Field delimiter of the input file
    pub delimiter: u8,
    // Trim whitespace around fields before parsing numbers
    pub trim: bool,
    // Only the first `row_limit` rows are clustered; None clusters all rows
    pub row_limit: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: true,
            row_limit: None,
        }
    }
}

impl FromIni for LoaderConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "loader" {
            return None;
        }

        let value = value.trim_matches('"');
        match key {
            "delimiter" => {
                let delimiter = match value {
                    "\\t" | "tab" => Some(b'\t'),
                    v if v.len() == 1 && v.is_ascii() => v.bytes().next(),
                    _ => None,
                };
                Some(match delimiter {
                    Some(d) => {
                        self.delimiter = d;
                        Ok(())
                    },
                    None => Err(Error::Config(
                        format!("Invalid delimiter (must be a single ASCII character): {}", value)
                    )),
                })
            },
            "trim" => Some(match parse_bool(value) {
                Some(trim) => {
                    self.trim = trim;
                    Ok(())
                },
                None => Err(Error::Config(format!("Invalid boolean for trim: {}", value))),
            }),
            "row_limit" => Some(match value.to_lowercase().as_str() {
                "" | "none" | "all" => {
                    self.row_limit = None;
                    Ok(())
                },
                v => match v.parse::<usize>() {
                    Ok(limit) if limit > 0 => {
                        self.row_limit = Some(limit);
                        Ok(())
                    },
                    _ => Err(Error::Config(
                        format!("Invalid row_limit (must be > 0 or 'none'): {}", value)
                    )),
                },
            }),
            _ => None,
        }
    }
}

impl LoaderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.row_limit == Some(0) {
            return Err(Error::Config("row_limit must be greater than 0".to_string()));
        }
        if self.delimiter == b'"' || self.delimiter == b'\n' {
            return Err(Error::Config(
                format!("delimiter {:?} cannot be used", self.delimiter as char)
            ));
        }
        Ok(())
    }
}
