//! Magasin Core - inventory domain model and persistence-independent logic
//!
//! This crate provides:
//! - Leaf entities (article, local, fournisseur, consommateur, magasinier, stock)
//! - The two order aggregates, generic over their family (interne / externe)
//! - Child-collection reconciliation planning used by the store on update
//! - Caller-side validation rules
//! - The canonical error and structured logging facilities

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod reconcile;
pub mod rules;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, MagasinError, Result};
pub use model::{Commande, CommandeExterne, CommandeInterne, Externe, Interne, OrderFamily};
pub use reconcile::{plan, ReconcilePlan};
