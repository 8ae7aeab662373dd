//! Enumerated string columns
//!
//! Both enums round-trip arbitrary strings: values written by other tools
//! that this crate does not know about are kept verbatim in `Autre`.
//! Equality and hashing go through the stored string, so `Autre("Validée")`
//! and `Validee` are the same status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Status of an internal or external order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatutCommande {
    #[default]
    EnAttente,
    Validee,
    EnCours,
    Livree,
    Annulee,
    Autre(String),
}

impl StatutCommande {
    pub fn as_str(&self) -> &str {
        match self {
            StatutCommande::EnAttente => "En attente",
            StatutCommande::Validee => "Validée",
            StatutCommande::EnCours => "En cours",
            StatutCommande::Livree => "Livrée",
            StatutCommande::Annulee => "Annulée",
            StatutCommande::Autre(s) => s,
        }
    }
}

impl From<String> for StatutCommande {
    fn from(s: String) -> Self {
        match s.as_str() {
            "En attente" => StatutCommande::EnAttente,
            "Validée" => StatutCommande::Validee,
            "En cours" => StatutCommande::EnCours,
            "Livrée" => StatutCommande::Livree,
            "Annulée" => StatutCommande::Annulee,
            _ => StatutCommande::Autre(s),
        }
    }
}

impl From<&str> for StatutCommande {
    fn from(s: &str) -> Self {
        StatutCommande::from(s.to_string())
    }
}

impl From<StatutCommande> for String {
    fn from(statut: StatutCommande) -> Self {
        statut.as_str().to_string()
    }
}

impl PartialEq for StatutCommande {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for StatutCommande {}

impl Hash for StatutCommande {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for StatutCommande {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition of an article on an internal order line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EtatArticle {
    #[default]
    Neuf,
    Bon,
    Usage,
    Endommage,
    Autre(String),
}

impl EtatArticle {
    pub fn as_str(&self) -> &str {
        match self {
            EtatArticle::Neuf => "Neuf",
            EtatArticle::Bon => "Bon",
            EtatArticle::Usage => "Usagé",
            EtatArticle::Endommage => "Endommagé",
            EtatArticle::Autre(s) => s,
        }
    }
}

impl From<String> for EtatArticle {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Neuf" => EtatArticle::Neuf,
            "Bon" => EtatArticle::Bon,
            "Usagé" => EtatArticle::Usage,
            "Endommagé" => EtatArticle::Endommage,
            _ => EtatArticle::Autre(s),
        }
    }
}

impl From<&str> for EtatArticle {
    fn from(s: &str) -> Self {
        EtatArticle::from(s.to_string())
    }
}

impl From<EtatArticle> for String {
    fn from(etat: EtatArticle) -> Self {
        etat.as_str().to_string()
    }
}

impl PartialEq for EtatArticle {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for EtatArticle {}

impl Hash for EtatArticle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for EtatArticle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
