//! Presentation manager configuration
//!
//! The configuration can be built in code or loaded from a TOML, JSON or
//! YAML file. Keys are kebab-case:
//!
//! ```toml
//! id = "viewer"
//! mode = "read-write"
//! updates-poll-interval = 250
//! active-locale = "en"
//! active-unit-system = "metric"
//! ruleset-directories = ["assets/rulesets"]
//! schemas-preload = true
//!
//! [task-allocations-map]
//! 1 = 2
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pres_engine::{EngineOptions, SessionMode};
use pres_types::UnitSystem;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Configuration of a [`PresentationManager`](crate::PresentationManager)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ManagerConfig {
    /// Manager identifier passed to the engine
    pub id: Option<String>,
    pub locale_directories: Vec<PathBuf>,
    /// Directories the engine scans for rulesets referenced by id
    pub ruleset_directories: Vec<PathBuf>,
    /// Directories with supplemental rulesets, appended to the built-in one
    pub supplemental_ruleset_directories: Vec<PathBuf>,
    pub active_locale: Option<String>,
    pub active_unit_system: Option<UnitSystem>,
    /// Worker thread counts keyed by task priority
    pub task_allocations_map: BTreeMap<String, u32>,
    pub mode: SessionMode,
    /// Update polling interval in milliseconds (read-write sessions only)
    pub updates_poll_interval: Option<u64>,
    pub cache_directory: Option<PathBuf>,
    /// Load store schemas as soon as a store is opened
    pub schemas_preload: bool,
}

impl ManagerConfig {
    /// Create a default (read-only) configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file.
    ///
    /// Format is detected from the file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read,
    /// [`Error::ConfigParse`] if it is malformed and
    /// [`Error::UnsupportedFormat`] for any other extension.
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();
        let content = std::fs::read_to_string(path)?;

        let parse_error = |format: &str, message: String| Error::ConfigParse {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        let config: Self = match extension.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| parse_error("TOML", e.to_string()))?,
            "json" => {
                serde_json::from_str(&content).map_err(|e| parse_error("JSON", e.to_string()))?
            }
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|e| parse_error("YAML", e.to_string()))?
            }
            _ => return Err(Error::UnsupportedFormat { extension }),
        };

        tracing::debug!(path = %path.display(), mode = %config.mode, "Loaded manager config");
        Ok(config)
    }

    /// Polling interval, when update polling applies to this configuration.
    ///
    /// Only read-write sessions with a non-zero interval poll.
    pub fn poll_interval(&self) -> Option<Duration> {
        if !self.mode.is_read_write() {
            return None;
        }
        self.updates_poll_interval
            .filter(|millis| *millis > 0)
            .map(Duration::from_millis)
    }

    /// Options handed to the engine at start-up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when a task allocation key is not a
    /// numeric priority.
    pub fn engine_options(&self) -> Result<EngineOptions> {
        let mut task_allocations = BTreeMap::new();
        for (priority, count) in &self.task_allocations_map {
            let priority: u32 = priority.trim().parse().map_err(|_| Error::InvalidConfig {
                key: "task-allocations-map".into(),
                message: format!("priority `{}` is not a number", priority),
            })?;
            task_allocations.insert(priority, *count);
        }

        Ok(EngineOptions {
            id: self.id.clone().unwrap_or_default(),
            locale_directories: self.locale_directories.clone(),
            task_allocations,
            cache_directory: self.cache_directory.clone(),
            mode: self.mode,
        })
    }
}
