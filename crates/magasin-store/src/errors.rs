//! Error handling for magasin-store
//!
//! Wraps magasin-core ExError with store-specific helpers

use magasin_core::errors::{ExError, ExErrorKind};
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Migration)
        .with_op("migration")
        .with_entity_id(migration_id)
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Migration)
        .with_op("migration_checksum")
        .with_entity_id(migration_id)
        .with_message(format!(
            "Checksum mismatch for migration {}: recorded {}, embedded {}",
            migration_id, expected, actual
        ))
}

/// Create a configuration error
pub fn config_error(reason: &str) -> ExError {
    ExError::new(ExErrorKind::Configuration)
        .with_op("config_load")
        .with_message(reason.to_string())
}

/// Map a rusqlite error onto the canonical taxonomy
///
/// Foreign key, unique, not-null and check failures become
/// `ConstraintViolation`; everything else is `Persistence`. The SQLite
/// message is kept verbatim.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            ExErrorKind::ConstraintViolation
        }
        _ => ExErrorKind::Persistence,
    };

    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Seed file rejected before anything is written
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error("YAML parse error: {0}")]
    Parse(String),

    #[error("Unsupported schema_version: {0}. Expected 0")]
    UnsupportedVersion(u32),

    #[error("Duplicate {kind} key '{key}'")]
    DuplicateKey { kind: &'static str, key: String },

    #[error("{owner} '{owner_key}' references unknown {kind} '{key}'")]
    UnresolvedReference {
        owner: &'static str,
        owner_key: String,
        kind: &'static str,
        key: String,
    },
}

impl From<SeedError> for ExError {
    fn from(err: SeedError) -> Self {
        let base = ExError::new(ExErrorKind::Seed).with_op("seed_parse");
        let base = match &err {
            SeedError::DuplicateKey { kind, key } => base.with_entity(*kind).with_entity_id(key),
            SeedError::UnresolvedReference { kind, key, .. } => {
                base.with_entity(*kind).with_entity_id(key)
            }
            SeedError::Parse(_) | SeedError::UnsupportedVersion(_) => base,
        };
        base.with_message(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_constraint_failure_maps_to_constraint_violation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT NOT NULL UNIQUE)")
            .unwrap();
        conn.execute("INSERT INTO t (v) VALUES ('a')", []).unwrap();

        let err = conn
            .execute("INSERT INTO t (v) VALUES ('a')", [])
            .map_err(from_rusqlite)
            .unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
        assert!(err.message().contains("UNIQUE"));
    }

    #[test]
    fn test_other_failures_map_to_persistence() {
        let conn = Connection::open_in_memory().unwrap();

        let err = conn
            .execute("INSERT INTO missing_table (v) VALUES (1)", [])
            .map_err(from_rusqlite)
            .unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert!(err.message().contains("missing_table"));
    }

    #[test]
    fn test_seed_error_carries_key() {
        let err: ExError = SeedError::DuplicateKey {
            kind: "article",
            key: "vis".to_string(),
        }
        .into();

        assert_eq!(err.kind(), ExErrorKind::Seed);
        assert_eq!(err.entity(), Some("article"));
        assert_eq!(err.entity_id(), Some("vis"));
    }
}
