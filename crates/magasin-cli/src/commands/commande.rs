//! Order commands
//!
//! Usage:
//!   magasin commande show <interne|externe> <ID>
//!   magasin commande list <interne|externe> [--statut <STATUT>]
//!   magasin commande delete <interne|externe> <ID>

use clap::{Args, Subcommand, ValueEnum};
use magasin_core::errors::{ExError, ExErrorKind, MagasinError};
use magasin_core::model::StatutCommande;
use magasin_store::repo::{CommandeExterneRepo, CommandeInterneRepo};
use magasin_store::{db, Result, StoreConfig};
use serde::Serialize;

#[derive(Debug, Args)]
pub struct CommandeArgs {
    #[command(subcommand)]
    pub command: CommandeCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Famille {
    Interne,
    Externe,
}

impl Famille {
    fn name(self) -> &'static str {
        match self {
            Famille::Interne => "interne",
            Famille::Externe => "externe",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CommandeCommand {
    /// Print one order with its lines and locations as JSON
    Show {
        famille: Famille,
        id: i64,
    },
    /// Print every order of a family as JSON
    List {
        famille: Famille,
        /// Only orders with this status (e.g. "En attente")
        #[arg(long)]
        statut: Option<String>,
    },
    /// Delete an order and its children
    Delete {
        famille: Famille,
        id: i64,
    },
}

pub fn execute(args: CommandeArgs, config: &StoreConfig) -> Result<()> {
    let mut conn = db::open_with_config(config)?;

    match args.command {
        CommandeCommand::Show { famille, id } => {
            let found = match famille {
                Famille::Interne => CommandeInterneRepo::get_by_id(&conn, id)?.map(to_json),
                Famille::Externe => CommandeExterneRepo::get_by_id(&conn, id)?.map(to_json),
            };
            let json = found.ok_or_else(|| MagasinError::CommandeNotFound {
                famille: famille.name().to_string(),
                commande_id: id,
            })??;
            println!("{}", json);
        }
        CommandeCommand::List { famille, statut } => {
            let statut = statut.map(StatutCommande::from);
            let json = match (famille, &statut) {
                (Famille::Interne, Some(s)) => {
                    to_json(CommandeInterneRepo::list_by_statut(&conn, s)?)
                }
                (Famille::Interne, None) => to_json(CommandeInterneRepo::list(&conn)?),
                (Famille::Externe, Some(s)) => {
                    to_json(CommandeExterneRepo::list_by_statut(&conn, s)?)
                }
                (Famille::Externe, None) => to_json(CommandeExterneRepo::list(&conn)?),
            }?;
            println!("{}", json);
        }
        CommandeCommand::Delete { famille, id } => {
            let existed = match famille {
                Famille::Interne => CommandeInterneRepo::delete(&mut conn, id)?,
                Famille::Externe => CommandeExterneRepo::delete(&mut conn, id)?,
            };
            if existed {
                println!("✓ Deleted commande {} {}", famille.name(), id);
            } else {
                println!(
                    "Nothing to delete: commande {} {} does not exist",
                    famille.name(),
                    id
                );
            }
        }
    }

    Ok(())
}

fn to_json<T: Serialize>(value: T) -> Result<String> {
    serde_json::to_string_pretty(&value).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("commande_render")
            .with_message(e.to_string())
    })
}
