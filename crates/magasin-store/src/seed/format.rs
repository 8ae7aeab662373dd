//! Seed format v0
//!
//! A seed lists leaf entities and orders. Entities that others point at
//! carry a seed-local `key`; references name those keys and are resolved to
//! store-assigned ids during import.

use serde::{Deserialize, Serialize};

/// Top-level seed file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedV0 {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,
    #[serde(default)]
    pub magasiniers: Vec<SeedMagasinier>,
    #[serde(default)]
    pub consommateurs: Vec<SeedConsommateur>,
    #[serde(default)]
    pub fournisseurs: Vec<SeedFournisseur>,
    #[serde(default)]
    pub locaux: Vec<SeedLocal>,
    #[serde(default)]
    pub articles: Vec<SeedArticle>,
    #[serde(default)]
    pub stocks: Vec<SeedStock>,
    #[serde(default)]
    pub commandes_internes: Vec<SeedCommande>,
    #[serde(default)]
    pub commandes_externes: Vec<SeedCommande>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedMagasinier {
    pub key: String,
    pub nom: String,
    pub nom_utilisateur: String,
    /// Already hashed; the seed never carries clear-text passwords
    pub mot_de_passe_hash: String,
    #[serde(default = "default_true")]
    pub actif: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConsommateur {
    pub key: String,
    pub nom: String,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub departement: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedFournisseur {
    pub key: String,
    pub nom: String,
    pub adresse: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub site_web: Option<String>,
    pub contact_principal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedLocal {
    pub key: String,
    pub nom: String,
    pub emplacement: Option<String>,
    #[serde(rename = "type")]
    pub type_local: Option<String>,
    /// Key of the responsible storekeeper
    pub responsable: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedArticle {
    pub key: String,
    pub nom: String,
    pub description: Option<String>,
    pub categorie: Option<String>,
    pub unite: Option<String>,
    #[serde(default)]
    pub quantite_min: i64,
    #[serde(default)]
    pub critique: bool,
    #[serde(default = "default_true")]
    pub actif: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedStock {
    pub article: String,
    pub local: String,
    pub quantite: i64,
}

/// Order of either family
///
/// `contrepartie` names a consumer key for internal orders and a supplier
/// key for external ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCommande {
    pub key: String,
    pub statut: Option<String>,
    pub magasinier: String,
    pub contrepartie: String,
    pub local: String,
    #[serde(default)]
    pub articles: Vec<SeedLigne>,
    #[serde(default)]
    pub locaux: Vec<SeedLocalisation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedLigne {
    pub article: String,
    pub quantite: i64,
    /// Internal orders only
    pub etat: Option<String>,
    /// Internal orders only
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedLocalisation {
    pub local: String,
    /// Internal orders only
    pub notes: Option<String>,
}

fn default_true() -> bool {
    true
}
