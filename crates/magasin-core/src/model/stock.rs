use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quantity of one article held at one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub id: Option<i64>,
    pub quantite: i64,
    pub article_id: i64,
    pub local_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Stock {
    pub fn new(article_id: i64, local_id: i64, quantite: i64) -> Self {
        Self {
            id: None,
            quantite,
            article_id,
            local_id,
            created_at: None,
            updated_at: None,
        }
    }
}
