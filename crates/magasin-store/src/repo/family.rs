//! Table bindings of the two order families

use magasin_core::model::{
    CommandeExterneArticle, CommandeExterneLocal, CommandeInterneArticle, CommandeInterneLocal,
    EtatArticle, Externe, Interne, OrderChild, OrderFamily,
};
use rusqlite::types::Value;
use rusqlite::Row;

/// Mapping between an order child type and its table
pub trait ChildTable: OrderChild {
    const TABLE: &'static str;
    /// Foreign key column pointing at the owning order
    const PARENT_COLUMN: &'static str;
    /// Columns other than `id` and the parent column, in `data_values()` order
    const DATA_COLUMNS: &'static [&'static str];

    fn data_values(&self) -> Vec<Value>;
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn select_columns() -> String {
        let mut columns = vec!["id", Self::PARENT_COLUMN];
        columns.extend_from_slice(Self::DATA_COLUMNS);
        columns.join(", ")
    }
}

/// Parent-table binding of an order family
pub trait FamilyTables: OrderFamily {
    const PARENT_TABLE: &'static str;
    /// Column holding the counterpart reference (consumer or supplier)
    const COUNTERPART_COLUMN: &'static str;
}

impl FamilyTables for Interne {
    const PARENT_TABLE: &'static str = "commande_interne";
    const COUNTERPART_COLUMN: &'static str = "consommateur_id";
}

impl FamilyTables for Externe {
    const PARENT_TABLE: &'static str = "commande_externe";
    const COUNTERPART_COLUMN: &'static str = "fournisseur_id";
}

impl ChildTable for CommandeInterneArticle {
    const TABLE: &'static str = "commande_interne_article";
    const PARENT_COLUMN: &'static str = "commande_interne_id";
    const DATA_COLUMNS: &'static [&'static str] = &["article_id", "quantite", "etat", "notes"];

    fn data_values(&self) -> Vec<Value> {
        vec![
            self.article_id.into(),
            self.quantite.into(),
            self.etat.as_str().to_string().into(),
            self.notes.clone().into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let etat: String = row.get("etat")?;
        Ok(CommandeInterneArticle {
            id: Some(row.get("id")?),
            commande_id: Some(row.get(Self::PARENT_COLUMN)?),
            article_id: row.get("article_id")?,
            quantite: row.get("quantite")?,
            etat: EtatArticle::from(etat),
            notes: row.get("notes")?,
        })
    }
}

impl ChildTable for CommandeInterneLocal {
    const TABLE: &'static str = "commande_interne_local";
    const PARENT_COLUMN: &'static str = "commande_interne_id";
    const DATA_COLUMNS: &'static [&'static str] = &["local_id", "notes"];

    fn data_values(&self) -> Vec<Value> {
        vec![self.local_id.into(), self.notes.clone().into()]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CommandeInterneLocal {
            id: Some(row.get("id")?),
            commande_id: Some(row.get(Self::PARENT_COLUMN)?),
            local_id: row.get("local_id")?,
            notes: row.get("notes")?,
        })
    }
}

impl ChildTable for CommandeExterneArticle {
    const TABLE: &'static str = "commande_externe_article";
    const PARENT_COLUMN: &'static str = "commande_externe_id";
    const DATA_COLUMNS: &'static [&'static str] = &["article_id", "quantite"];

    fn data_values(&self) -> Vec<Value> {
        vec![self.article_id.into(), self.quantite.into()]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CommandeExterneArticle {
            id: Some(row.get("id")?),
            commande_id: Some(row.get(Self::PARENT_COLUMN)?),
            article_id: row.get("article_id")?,
            quantite: row.get("quantite")?,
        })
    }
}

impl ChildTable for CommandeExterneLocal {
    const TABLE: &'static str = "commande_externe_local";
    const PARENT_COLUMN: &'static str = "commande_externe_id";
    const DATA_COLUMNS: &'static [&'static str] = &["local_id"];

    fn data_values(&self) -> Vec<Value> {
        vec![self.local_id.into()]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CommandeExterneLocal {
            id: Some(row.get("id")?),
            commande_id: Some(row.get(Self::PARENT_COLUMN)?),
            local_id: row.get("local_id")?,
        })
    }
}
