//! Inventory domain model
//!
//! Leaf entities (one table each) and the two order aggregates.

pub mod article;
pub mod commande;
pub mod consommateur;
pub mod fournisseur;
pub mod local;
pub mod magasinier;
pub mod statut;
pub mod stock;

pub use article::Article;
pub use commande::{
    ArticleLine, Commande, CommandeExterne, CommandeExterneArticle, CommandeExterneLocal,
    CommandeInterne, CommandeInterneArticle, CommandeInterneLocal, Externe, Interne, LocalLine,
    OrderChild, OrderFamily,
};
pub use consommateur::Consommateur;
pub use fournisseur::Fournisseur;
pub use local::Local;
pub use magasinier::Magasinier;
pub use statut::{EtatArticle, StatutCommande};
pub use stock::Stock;
