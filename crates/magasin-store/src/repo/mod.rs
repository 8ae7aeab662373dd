//! Repository layer persisting the inventory model to SQLite
//!
//! Leaf entities go through the generic [`LeafRepo`]; orders through the
//! aggregate [`OrderRepo`], generic over the order family.

pub mod commande;
pub mod entities;
pub mod family;
pub mod leaf;
pub mod timestamps;

pub use commande::{CommandeExterneRepo, CommandeInterneRepo, OrderRepo};
pub use entities::{
    ArticleRepo, ConsommateurRepo, FournisseurRepo, LocalRepo, MagasinierRepo, StockRepo,
};
pub use family::{ChildTable, FamilyTables};
pub use leaf::{LeafRepo, LeafTable, Timestamps};
