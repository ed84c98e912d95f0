//! Service configuration, read once at startup and injected into the engine.
//!
//! ```toml
//! # "release" (default), "debug" or "testing"
//! database_type = "testing"
//! # SQLite file, or ":memory:"
//! database_path = "finetrack.db"
//! log_filter = "info,finetrack_engine=debug"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub const IN_MEMORY_PATH: &str = ":memory:";

/// Which data set the operations act on. Each flavour has its own root
/// segment in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    Release,
    Debug,
    Testing,
}

impl DatabaseType {
    pub fn root_segment(&self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Debug => "debug",
            Self::Testing => "testing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub database_type: DatabaseType,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_database_path() -> String {
    IN_MEMORY_PATH.to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_type: DatabaseType::default(),
            database_path: default_database_path(),
            log_filter: default_log_filter(),
        }
    }
}

impl ServiceConfig {
    /// In-memory store on the testing root.
    pub fn testing() -> Self {
        Self {
            database_type: DatabaseType::Testing,
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, EngineError> {
        toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == IN_MEMORY_PATH
    }
}
