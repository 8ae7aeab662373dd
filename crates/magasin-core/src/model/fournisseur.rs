use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supplier, counterpart of external orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fournisseur {
    pub id: Option<i64>,
    pub nom: String,
    pub adresse: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub site_web: Option<String>,
    pub contact_principal: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Fournisseur {
    pub fn new(nom: impl Into<String>) -> Self {
        Self {
            id: None,
            nom: nom.into(),
            adresse: None,
            telephone: None,
            email: None,
            site_web: None,
            contact_principal: None,
            created_at: None,
            updated_at: None,
        }
    }
}
