//! Seed import command
//!
//! Usage: magasin seed import <PATH>...

use clap::{Args, Subcommand};
use magasin_store::{db, migrations, seed, Result, StoreConfig};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct SeedArgs {
    #[command(subcommand)]
    pub command: SeedCommand,
}

#[derive(Debug, Subcommand)]
pub enum SeedCommand {
    /// Import a seed file into the database
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to seed YAML file or directory
    pub path: PathBuf,
}

/// Execute seed command
pub fn execute(args: SeedArgs, config: &StoreConfig) -> Result<()> {
    match args.command {
        SeedCommand::Import(import_args) => execute_import(import_args, config),
    }
}

/// Seed files to import, sorted for determinism when given a directory
fn seed_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)
        .map_err(|e| magasin_store::errors::io_error("seed_read_dir", e))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Execute seed import
fn execute_import(args: ImportArgs, config: &StoreConfig) -> Result<()> {
    let mut conn = db::open_with_config(config)?;
    migrations::apply_migrations(&mut conn)?;

    for seed_file in seed_files(&args.path)? {
        println!("Importing {}...", seed_file.display());
        let summary = seed::import_seed(&seed_file, &mut conn)?;
        let total: usize = summary.created.values().sum();
        println!("✓ Imported {} entities", total);
        for (kind, count) in &summary.created {
            println!("  {}: {}", kind, count);
        }
    }

    Ok(())
}
