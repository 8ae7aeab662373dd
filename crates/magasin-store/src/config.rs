//! Store configuration loaded from TOML
//!
//! ```toml
//! [database]
//! path = "magasin.db"
//! busy_timeout_ms = 5000
//! journal_mode = "wal"
//!
//! [logging]
//! profile = "production"
//! ```
//!
//! Every key is optional; missing keys fall back to `Default`.

#![allow(clippy::result_large_err)]

use crate::errors::{config_error, io_error, Result};
use magasin_core::logging_facility::Profile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
    pub journal_mode: JournalMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("magasin.db"),
            busy_timeout_ms: 5000,
            journal_mode: JournalMode::Wal,
        }
    }
}

/// SQLite journal mode applied when a connection is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    #[default]
    Wal,
    Delete,
    Memory,
}

impl JournalMode {
    pub fn as_pragma(&self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
            JournalMode::Memory => "MEMORY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub profile: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            profile: "development".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parsed logging profile
    pub fn profile(&self) -> Result<Profile> {
        self.profile
            .parse::<Profile>()
            .map_err(|reason| config_error(&reason))
    }
}

impl StoreConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| io_error("config_load", e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(content)
            .map_err(|e| config_error(&format!("Invalid configuration: {}", e)))?;
        // Surface a bad profile at load time rather than at init
        config.logging.profile()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magasin_core::errors::ExErrorKind;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.database.journal_mode, JournalMode::Wal);
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let config = StoreConfig::from_toml_str(
            r#"
            [database]
            path = "/var/lib/magasin/stock.db"
            journal_mode = "delete"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.database.path,
            PathBuf::from("/var/lib/magasin/stock.db")
        );
        assert_eq!(config.database.journal_mode, JournalMode::Delete);
        assert_eq!(config.database.busy_timeout_ms, 5000);
        assert_eq!(config.logging.profile().unwrap(), Profile::Development);
    }

    #[test]
    fn test_unknown_profile_is_configuration_error() {
        let err = StoreConfig::from_toml_str("[logging]\nprofile = \"verbose\"").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Configuration);
    }

    #[test]
    fn test_unknown_journal_mode_is_configuration_error() {
        let err =
            StoreConfig::from_toml_str("[database]\njournal_mode = \"truncate\"").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Configuration);
    }
}
