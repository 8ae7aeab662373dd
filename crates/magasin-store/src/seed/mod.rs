//! Seed import system
//!
//! Provides:
//! - Seed format v0 schema
//! - YAML parser with validation
//! - Importer running the whole seed in one transaction

pub mod format;
pub mod importer;
pub mod parser;

pub use format::SeedV0;
pub use importer::{import_parsed, import_seed, SeedSummary};
pub use parser::{parse_seed_file, parse_seed_str};
