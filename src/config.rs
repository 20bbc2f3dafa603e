//! Environment-driven settings.
//!
//! Values come from the process environment (optionally seeded from a `.env`
//! file by the binary) and may be overridden by CLI flags.

use std::path::PathBuf;

use crate::error::Result;
use crate::pipeline::classify::CategoryMap;

pub const DATA_PATH_VAR: &str = "OLYMPIC_DATA_PATH";
pub const CATEGORY_MAP_VAR: &str = "OLYMPIC_CATEGORY_MAP";
pub const LOG_FILE_VAR: &str = "LOG_FILE_PATH";

pub const DEFAULT_DATA_PATH: &str = "data.csv";
pub const DEFAULT_LOG_FILE: &str = "logs/olympic_medals.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_path: PathBuf,
    pub category_map: Option<PathBuf>,
    pub log_file_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Settings {
            data_path: get(DATA_PATH_VAR)
                .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string())
                .into(),
            category_map: get(CATEGORY_MAP_VAR).map(PathBuf::from),
            log_file_path: get(LOG_FILE_VAR)
                .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
                .into(),
        }
    }

    /// The configured category table, or the built-in one.
    pub fn load_category_map(&self) -> Result<CategoryMap> {
        match &self.category_map {
            Some(path) => CategoryMap::load(path),
            None => Ok(CategoryMap::default()),
        }
    }
}
