use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A storage location (room, shelf, workshop)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Local {
    pub id: Option<i64>,
    pub nom: String,
    pub emplacement: Option<String>,
    /// Stored in the `type` column
    pub type_local: Option<String>,
    /// Storekeeper responsible for the location
    pub responsable_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Local {
    pub fn new(nom: impl Into<String>) -> Self {
        Self {
            id: None,
            nom: nom.into(),
            emplacement: None,
            type_local: None,
            responsable_id: None,
            created_at: None,
            updated_at: None,
        }
    }
}
