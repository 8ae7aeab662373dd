pub mod commande;
pub mod migrate;
pub mod seed;
