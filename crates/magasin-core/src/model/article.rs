use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stocked article (part, consumable, tool)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Store-assigned identity; `None` until inserted
    pub id: Option<i64>,
    pub nom: String,
    pub description: Option<String>,
    pub categorie: Option<String>,
    /// Unit of measure ("pièce", "litre", ...)
    pub unite: Option<String>,
    /// Reorder threshold
    pub quantite_min: i64,
    /// Critical articles are surfaced first when stock runs low
    pub critique: bool,
    pub actif: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn new(nom: impl Into<String>) -> Self {
        Self {
            id: None,
            nom: nom.into(),
            description: None,
            categorie: None,
            unite: None,
            quantite_min: 0,
            critique: false,
            actif: true,
            created_at: None,
            updated_at: None,
        }
    }
}
