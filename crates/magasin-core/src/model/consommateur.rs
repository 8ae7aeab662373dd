use serde::{Deserialize, Serialize};

/// Consumer (person or department) requesting internal orders
///
/// The `consommateur` table carries no timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consommateur {
    pub id: Option<i64>,
    pub nom: String,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub departement: Option<String>,
    pub description: Option<String>,
}

impl Consommateur {
    pub fn new(nom: impl Into<String>) -> Self {
        Self {
            id: None,
            nom: nom.into(),
            email: None,
            telephone: None,
            departement: None,
            description: None,
        }
    }
}
