//! Table mappings for the leaf entities, plus their entity-specific queries

#![allow(clippy::result_large_err)]

use chrono::{DateTime, Utc};
use magasin_core::errors::MagasinError;
use magasin_core::model::{Article, Consommateur, Fournisseur, Local, Magasinier, Stock};
use magasin_core_types::Sensitive;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::errors::{from_rusqlite, Result};
use crate::repo::leaf::{select_columns, LeafRepo, LeafTable, Timestamps};
use crate::repo::timestamps::{from_millis, get_datetime, get_opt_datetime, NOW_MS};

pub type ArticleRepo = LeafRepo<Article>;
pub type LocalRepo = LeafRepo<Local>;
pub type FournisseurRepo = LeafRepo<Fournisseur>;
pub type ConsommateurRepo = LeafRepo<Consommateur>;
pub type MagasinierRepo = LeafRepo<Magasinier>;
pub type StockRepo = LeafRepo<Stock>;

impl LeafTable for Article {
    const TABLE: &'static str = "article";
    const COLUMNS: &'static [&'static str] = &[
        "nom",
        "description",
        "categorie",
        "unite",
        "quantite_min",
        "critique",
        "actif",
    ];
    const TIMESTAMPS: Timestamps = Timestamps::CreatedUpdated;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.nom.clone().into(),
            self.description.clone().into(),
            self.categorie.clone().into(),
            self.unite.clone().into(),
            self.quantite_min.into(),
            self.critique.into(),
            self.actif.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Article {
            id: Some(row.get("id")?),
            nom: row.get("nom")?,
            description: row.get("description")?,
            categorie: row.get("categorie")?,
            unite: row.get("unite")?,
            quantite_min: row.get("quantite_min")?,
            critique: row.get("critique")?,
            actif: row.get("actif")?,
            created_at: Some(get_datetime(row, "created_at")?),
            updated_at: Some(get_datetime(row, "updated_at")?),
        })
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
}

impl LeafTable for Local {
    const TABLE: &'static str = "local";
    const COLUMNS: &'static [&'static str] = &["nom", "emplacement", "type", "responsable_id"];
    const TIMESTAMPS: Timestamps = Timestamps::CreatedUpdated;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.nom.clone().into(),
            self.emplacement.clone().into(),
            self.type_local.clone().into(),
            self.responsable_id.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Local {
            id: Some(row.get("id")?),
            nom: row.get("nom")?,
            emplacement: row.get("emplacement")?,
            type_local: row.get("type")?,
            responsable_id: row.get("responsable_id")?,
            created_at: Some(get_datetime(row, "created_at")?),
            updated_at: Some(get_datetime(row, "updated_at")?),
        })
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
}

impl LeafTable for Fournisseur {
    const TABLE: &'static str = "fournisseur";
    const COLUMNS: &'static [&'static str] = &[
        "nom",
        "adresse",
        "telephone",
        "email",
        "site_web",
        "contact_principal",
    ];
    const TIMESTAMPS: Timestamps = Timestamps::CreatedUpdated;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.nom.clone().into(),
            self.adresse.clone().into(),
            self.telephone.clone().into(),
            self.email.clone().into(),
            self.site_web.clone().into(),
            self.contact_principal.clone().into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Fournisseur {
            id: Some(row.get("id")?),
            nom: row.get("nom")?,
            adresse: row.get("adresse")?,
            telephone: row.get("telephone")?,
            email: row.get("email")?,
            site_web: row.get("site_web")?,
            contact_principal: row.get("contact_principal")?,
            created_at: Some(get_datetime(row, "created_at")?),
            updated_at: Some(get_datetime(row, "updated_at")?),
        })
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
}

impl LeafTable for Consommateur {
    const TABLE: &'static str = "consommateur";
    const COLUMNS: &'static [&'static str] =
        &["nom", "email", "telephone", "departement", "description"];
    const TIMESTAMPS: Timestamps = Timestamps::None;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.nom.clone().into(),
            self.email.clone().into(),
            self.telephone.clone().into(),
            self.departement.clone().into(),
            self.description.clone().into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Consommateur {
            id: Some(row.get("id")?),
            nom: row.get("nom")?,
            email: row.get("email")?,
            telephone: row.get("telephone")?,
            departement: row.get("departement")?,
            description: row.get("description")?,
        })
    }
}

impl LeafTable for Magasinier {
    const TABLE: &'static str = "magasinier";
    const COLUMNS: &'static [&'static str] =
        &["nom", "nom_utilisateur", "mot_de_passe_hash", "actif"];
    const READ_ONLY: &'static [&'static str] = &["dernier_connexion"];
    const TIMESTAMPS: Timestamps = Timestamps::Created;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.nom.clone().into(),
            self.nom_utilisateur.clone().into(),
            self.mot_de_passe_hash.expose().clone().into(),
            self.actif.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Magasinier {
            id: Some(row.get("id")?),
            nom: row.get("nom")?,
            nom_utilisateur: row.get("nom_utilisateur")?,
            mot_de_passe_hash: Sensitive::new(row.get("mot_de_passe_hash")?),
            actif: row.get("actif")?,
            created_at: Some(get_datetime(row, "created_at")?),
            dernier_connexion: get_opt_datetime(row, "dernier_connexion")?,
        })
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }
}

impl LeafTable for Stock {
    const TABLE: &'static str = "stock";
    const COLUMNS: &'static [&'static str] = &["quantite", "article_id", "local_id"];
    const TIMESTAMPS: Timestamps = Timestamps::CreatedUpdated;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.quantite.into(),
            self.article_id.into(),
            self.local_id.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Stock {
            id: Some(row.get("id")?),
            quantite: row.get("quantite")?,
            article_id: row.get("article_id")?,
            local_id: row.get("local_id")?,
            created_at: Some(get_datetime(row, "created_at")?),
            updated_at: Some(get_datetime(row, "updated_at")?),
        })
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
}

impl LeafRepo<Article> {
    /// Active articles flagged critical, ordered by id
    pub fn list_critical(conn: &Connection) -> Result<Vec<Article>> {
        Self::query(
            conn,
            &format!(
                "SELECT {} FROM article WHERE critique = 1 AND actif = 1 ORDER BY id",
                select_columns::<Article>()
            ),
            Vec::new(),
        )
    }
}

impl LeafRepo<Stock> {
    /// The stock row for one article at one location, if any
    pub fn find_by_article_and_local(
        conn: &Connection,
        article_id: i64,
        local_id: i64,
    ) -> Result<Option<Stock>> {
        let sql = format!(
            "SELECT {} FROM stock WHERE article_id = ?1 AND local_id = ?2",
            select_columns::<Stock>()
        );
        conn.query_row(&sql, [article_id, local_id], Stock::from_row)
            .optional()
            .map_err(from_rusqlite)
    }

    pub fn list_by_local(conn: &Connection, local_id: i64) -> Result<Vec<Stock>> {
        Self::query(
            conn,
            &format!(
                "SELECT {} FROM stock WHERE local_id = ?1 ORDER BY id",
                select_columns::<Stock>()
            ),
            vec![Value::Integer(local_id)],
        )
    }
}

impl LeafRepo<Magasinier> {
    pub fn find_by_username(
        conn: &Connection,
        nom_utilisateur: &str,
    ) -> Result<Option<Magasinier>> {
        let sql = format!(
            "SELECT {} FROM magasinier WHERE nom_utilisateur = ?1",
            select_columns::<Magasinier>()
        );
        conn.query_row(&sql, [nom_utilisateur], Magasinier::from_row)
            .optional()
            .map_err(from_rusqlite)
    }

    /// Stamp `dernier_connexion` with the store clock and return it
    ///
    /// # Errors
    ///
    /// - `NotFound` if no storekeeper has this id
    pub fn record_login(conn: &Connection, id: i64) -> Result<DateTime<Utc>> {
        let sql = format!(
            "UPDATE magasinier SET dernier_connexion = {} WHERE id = ?1 RETURNING dernier_connexion",
            NOW_MS
        );
        let stamped: Option<i64> = conn
            .query_row(&sql, [id], |row| row.get(0))
            .optional()
            .map_err(from_rusqlite)?;

        let ms = stamped.ok_or_else(|| MagasinError::EntityNotFound {
            entity: "magasinier".to_string(),
            id,
        })?;
        from_millis(ms).map_err(from_rusqlite)
    }
}
