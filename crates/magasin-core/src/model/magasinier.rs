use chrono::{DateTime, Utc};
use magasin_core_types::Sensitive;
use serde::Serialize;

/// Storekeeper account
///
/// Hashing the password is the caller's job; this type only carries the
/// hash, redacted from `Debug` output and never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Magasinier {
    pub id: Option<i64>,
    pub nom: String,
    /// Login name, unique across storekeepers
    pub nom_utilisateur: String,
    #[serde(skip_serializing)]
    pub mot_de_passe_hash: Sensitive<String>,
    pub actif: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub dernier_connexion: Option<DateTime<Utc>>,
}

impl Magasinier {
    pub fn new(
        nom: impl Into<String>,
        nom_utilisateur: impl Into<String>,
        mot_de_passe_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            nom: nom.into(),
            nom_utilisateur: nom_utilisateur.into(),
            mot_de_passe_hash: Sensitive::new(mot_de_passe_hash.into()),
            actif: true,
            created_at: None,
            dernier_connexion: None,
        }
    }
}
