//! Magasin CLI
//!
//! Command-line interface for the inventory store

use clap::{Parser, Subcommand};
use magasin_core::logging_facility::{self, Profile};
use magasin_core_types::{RequestContext, TraceId};
use magasin_store::StoreConfig;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "magasin")]
#[command(about = "Magasin - inventory and order store", long_about = None)]
struct Cli {
    /// SQLite database file (overrides the configuration file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// Seed import operations
    Seed(commands::seed::SeedArgs),
    /// Order operations
    Commande(commands::commande::CommandeArgs),
}

fn load_config(cli: &Cli) -> magasin_store::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    Ok(config)
}

/// Trace id forwarded by a calling process
const TRACE_ID_ENV: &str = "MAGASIN_TRACE_ID";

fn request_context() -> RequestContext {
    let ctx = RequestContext::new();
    match std::env::var(TRACE_ID_ENV) {
        Ok(trace_id) if !trace_id.is_empty() => {
            ctx.with_trace_id(TraceId::from_string(trace_id))
        }
        _ => ctx,
    }
}

fn main() {
    let cli = Cli::parse();
    let ctx = request_context();

    let result = load_config(&cli).and_then(|config| {
        logging_facility::init(config.logging.profile().unwrap_or(Profile::Development));
        let _span = tracing::info_span!(
            "request",
            request_id = ctx.request_id.as_str(),
            trace_id = ctx.trace_id.as_ref().map(TraceId::as_str)
        )
        .entered();

        match cli.command {
            Commands::Migrate => commands::migrate::execute(&config),
            Commands::Seed(args) => commands::seed::execute(args, &config),
            Commands::Commande(args) => commands::commande::execute(args, &config),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e.with_context(&ctx));
        std::process::exit(1);
    }
}
