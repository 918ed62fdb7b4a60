//! Persistent settings, stored as pretty JSON in the user config directory.
//!
//! A missing or unreadable file falls back to [`AppConfig::default`].
//! `TABCLEAN_DATA_DIR` overrides the raw data directory after loading.

use crate::error::{Result, ResultExt as _, TabcleanError};
use crate::pipeline::{Pipeline, StepKind};
use crate::types::ColumnKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`AppConfig::raw_data_dir`].
pub const DATA_DIR_ENV: &str = "TABCLEAN_DATA_DIR";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory the loader reads source files from.
    pub raw_data_dir: PathBuf,
    /// Cleaning steps, in execution order.
    pub steps: Vec<StepKind>,
    /// Columns for `clean_text_columns`; every text column when unset.
    pub text_columns: Option<Vec<String>>,
    /// Column kinds the validator enforces, by column name.
    pub expected_kinds: HashMap<String, ColumnKind>,
    /// Rows of each cleaned table to print.
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            raw_data_dir: PathBuf::from("data/raw"),
            steps: StepKind::ALL.to_vec(),
            text_columns: None,
            expected_kinds: HashMap::new(),
            preview_rows: 5,
        }
    }
}

impl AppConfig {
    /// The cleaning pipeline these settings describe.
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::from_kinds(&self.steps, self.text_columns.as_deref())
    }

    /// Apply `TABCLEAN_DATA_DIR` if it is set and non-empty.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV)
            && !dir.trim().is_empty()
        {
            self.raw_data_dir = PathBuf::from(dir);
        }
        self
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| TabcleanError::Config("Failed to determine config directory".to_owned()))?;
    Ok(base.join("tabclean").join("config.json"))
}

/// Load settings from the standard location, then apply environment overrides.
///
/// A missing or unreadable file gives the defaults.
pub fn load_app_config() -> AppConfig {
    let config = match get_config_path() {
        Ok(path) => load_from(&path),
        Err(e) => {
            tracing::warn!("{e}, using default configuration");
            AppConfig::default()
        }
    };
    config.with_env_overrides()
}

pub fn load_from(path: &Path) -> AppConfig {
    if path.exists()
        && let Ok(content) = std::fs::read_to_string(path)
    {
        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => return config,
            Err(e) => tracing::warn!("Ignoring invalid config at {}: {e}", path.display()),
        }
    }
    AppConfig::default()
}

pub fn save_app_config(config: &AppConfig) -> Result<()> {
    save_to(&get_config_path()?, config)
}

pub fn save_to(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
