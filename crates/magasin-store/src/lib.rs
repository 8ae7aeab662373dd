//! Magasin Store - SQLite persistence for the inventory model
//!
//! Provides:
//! - SQLite schema with migrations framework
//! - Connection provider and TOML configuration
//! - Leaf repositories and the transactional order aggregate repository
//! - YAML seed parser and importer

pub mod config;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod seed;

// Re-export key types
pub use config::StoreConfig;
pub use errors::Result;
