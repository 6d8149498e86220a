//! Engine start-up options

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Whether the session may modify the record store.
///
/// Only read-write sessions receive update notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    #[default]
    ReadOnly,
    ReadWrite,
}

impl SessionMode {
    /// Check whether the mode allows modifications.
    pub fn is_read_write(&self) -> bool {
        matches!(self, SessionMode::ReadWrite)
    }
}

impl FromStr for SessionMode {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read-only" | "readonly" | "ro" => Ok(SessionMode::ReadOnly),
            "read-write" | "readwrite" | "rw" => Ok(SessionMode::ReadWrite),
            _ => Err(EngineError::failed(format!("invalid session mode: {}", s))),
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::ReadOnly => write!(f, "read-only"),
            SessionMode::ReadWrite => write!(f, "read-write"),
        }
    }
}

/// Options handed to the engine once, when the manager is created
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOptions {
    /// Identifier of the manager owning the engine
    pub id: String,
    /// Directories with localization resources
    pub locale_directories: Vec<PathBuf>,
    /// Worker thread counts keyed by task priority
    pub task_allocations: BTreeMap<u32, u32>,
    /// Directory for persistent hierarchy caches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_directory: Option<PathBuf>,
    pub mode: SessionMode,
}
