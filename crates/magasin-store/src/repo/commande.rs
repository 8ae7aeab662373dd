//! Order aggregate repository
//!
//! One generic routine persists both order families. Every public
//! operation runs inside a single transaction:
//!
//! - insert writes the parent row, then article lines, then locations
//! - update rewrites the parent row and reconciles each child table against
//!   the in-memory collections (deletes, then updates, then inserts)
//! - delete removes article lines, locations, then the parent
//!
//! On failure the transaction is rolled back before the error is returned,
//! and identities or timestamps assigned by the store are only copied into
//! the in-memory aggregate once the commit has succeeded.
//!
//! ## Logging Ownership
//!
//! Public operations log start/end/error with timing. Rollbacks log at
//! `warn`; reconciliation plans at `debug`.

#![allow(clippy::result_large_err)]

use std::marker::PhantomData;
use std::time::Instant;

use chrono::{DateTime, Utc};
use magasin_core::errors::{ExError, MagasinError};
use magasin_core::model::{Commande, Externe, Interne, OrderChild, StatutCommande};
use magasin_core::reconcile::plan;
use magasin_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};

use crate::errors::{from_rusqlite, Result};
use crate::repo::family::{ChildTable, FamilyTables};
use crate::repo::timestamps::{from_millis, get_datetime, get_opt_datetime, to_millis, NOW_MS};

const OP_INSERT: &str = "commande_insert";
const OP_GET: &str = "commande_get";
const OP_UPDATE: &str = "commande_update";
const OP_DELETE: &str = "commande_delete";
const OP_LIST: &str = "commande_list";

/// Repository for one order family
pub struct OrderRepo<F>(PhantomData<F>);

pub type CommandeInterneRepo = OrderRepo<Interne>;
pub type CommandeExterneRepo = OrderRepo<Externe>;

/// Values assigned by the store during one write
#[derive(Debug)]
struct Assigned {
    id: i64,
    creer_a: Option<DateTime<Utc>>,
    mise_a_jour_a: Option<DateTime<Utc>>,
    /// (index in `articles`, new row id)
    articles: Vec<(usize, i64)>,
    /// (index in `locaux`, new row id)
    locaux: Vec<(usize, i64)>,
}

impl Assigned {
    fn apply_to<F: FamilyTables>(self, commande: &mut Commande<F>) {
        commande.id = Some(self.id);
        if let Some(at) = self.creer_a {
            commande.creer_a = Some(at);
        }
        if let Some(at) = self.mise_a_jour_a {
            commande.mise_a_jour_a = Some(at);
        }
        for (index, row_id) in self.articles {
            if let Some(ligne) = commande.articles.get_mut(index) {
                ligne.attach(row_id, self.id);
            }
        }
        for (index, row_id) in self.locaux {
            if let Some(ligne) = commande.locaux.get_mut(index) {
                ligne.attach(row_id, self.id);
            }
        }
    }
}

impl<F> OrderRepo<F>
where
    F: FamilyTables,
    F::LigneArticle: ChildTable,
    F::LigneLocal: ChildTable,
{
    /// Persist a new order with all its children
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the order already carries an id
    /// - `InvariantViolation` if a child already carries a row id
    /// - `ConstraintViolation` if a reference does not resolve
    pub fn insert(conn: &mut Connection, commande: &mut Commande<F>) -> Result<i64> {
        log_op_start!(
            OP_INSERT,
            famille = F::NAME,
            articles = commande.articles.len() as u64,
            locaux = commande.locaux.len() as u64
        );
        let start = Instant::now();

        let id = Self::insert_impl(conn, commande).map_err(|e| {
            log_op_error!(
                OP_INSERT,
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                famille = F::NAME
            );
            e
        })?;

        log_op_end!(
            OP_INSERT,
            duration_ms = start.elapsed().as_millis() as u64,
            famille = F::NAME,
            commande_id = id
        );

        Ok(id)
    }

    /// Insert inside a transaction owned by the caller
    ///
    /// Store-assigned values are written into `commande` immediately; the
    /// caller decides whether they survive by committing or not.
    pub fn insert_tx(tx: &Transaction<'_>, commande: &mut Commande<F>) -> Result<i64> {
        Self::ensure_new(commande)?;
        let assigned = Self::write_new(tx, commande)?;
        let id = assigned.id;
        assigned.apply_to(commande);
        Ok(id)
    }

    fn insert_impl(conn: &mut Connection, commande: &mut Commande<F>) -> Result<i64> {
        Self::ensure_new(commande)?;

        let tx = conn.transaction().map_err(from_rusqlite)?;
        let assigned = match Self::write_new(&tx, commande) {
            Ok(assigned) => assigned,
            Err(err) => return Err(rollback(tx, OP_INSERT, err)),
        };
        tx.commit().map_err(from_rusqlite)?;

        let id = assigned.id;
        assigned.apply_to(commande);
        Ok(id)
    }

    /// Load an order with its children, `None` if the id is unknown
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Commande<F>>> {
        log_op_start!(OP_GET, famille = F::NAME, commande_id = id);
        let start = Instant::now();

        let commande = Self::load(conn, id).map_err(|e| {
            log_op_error!(
                OP_GET,
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                famille = F::NAME
            );
            e
        })?;

        log_op_end!(
            OP_GET,
            duration_ms = start.elapsed().as_millis() as u64,
            famille = F::NAME,
            found = commande.is_some()
        );

        Ok(commande)
    }

    /// Persist parent fields and reconcile both child collections
    ///
    /// `confirmer_a` is only written when set in memory. `mise_a_jour_a`
    /// comes from the store clock and never precedes `creer_a`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the order has never been inserted
    /// - `NotFound` if the parent row no longer exists
    /// - `InvariantViolation` if a child carries a row id not stored for
    ///   this order, or the same row id twice
    /// - `ConstraintViolation` if a reference does not resolve
    pub fn update(conn: &mut Connection, commande: &mut Commande<F>) -> Result<()> {
        log_op_start!(OP_UPDATE, famille = F::NAME, commande_id = commande.id);
        let start = Instant::now();

        Self::update_impl(conn, commande).map_err(|e| {
            log_op_error!(
                OP_UPDATE,
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                famille = F::NAME
            );
            e
        })?;

        log_op_end!(
            OP_UPDATE,
            duration_ms = start.elapsed().as_millis() as u64,
            famille = F::NAME,
            commande_id = commande.id
        );

        Ok(())
    }

    fn update_impl(conn: &mut Connection, commande: &mut Commande<F>) -> Result<()> {
        let id = commande.id.ok_or_else(|| MagasinError::CommandeNotPersisted {
            famille: F::NAME.to_string(),
        })?;

        let tx = conn.transaction().map_err(from_rusqlite)?;
        let assigned = match Self::write_update(&tx, id, commande) {
            Ok(assigned) => assigned,
            Err(err) => return Err(rollback(tx, OP_UPDATE, err)),
        };
        tx.commit().map_err(from_rusqlite)?;

        assigned.apply_to(commande);
        Ok(())
    }

    /// Delete an order and all its children; `false` if it did not exist
    pub fn delete(conn: &mut Connection, id: i64) -> Result<bool> {
        log_op_start!(OP_DELETE, famille = F::NAME, commande_id = id);
        let start = Instant::now();

        let existed = Self::delete_impl(conn, id).map_err(|e| {
            log_op_error!(
                OP_DELETE,
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                famille = F::NAME
            );
            e
        })?;

        log_op_end!(
            OP_DELETE,
            duration_ms = start.elapsed().as_millis() as u64,
            famille = F::NAME,
            existed = existed
        );

        Ok(existed)
    }

    fn delete_impl(conn: &mut Connection, id: i64) -> Result<bool> {
        let tx = conn.transaction().map_err(from_rusqlite)?;
        let existed = match Self::delete_rows(&tx, id) {
            Ok(existed) => existed,
            Err(err) => return Err(rollback(tx, OP_DELETE, err)),
        };
        tx.commit().map_err(from_rusqlite)?;
        Ok(existed)
    }

    /// Every order of the family, ordered by id
    pub fn list(conn: &Connection) -> Result<Vec<Commande<F>>> {
        Self::list_where(conn, None)
    }

    pub fn list_by_statut(conn: &Connection, statut: &StatutCommande) -> Result<Vec<Commande<F>>> {
        Self::list_where(conn, Some(statut))
    }

    fn list_where(conn: &Connection, statut: Option<&StatutCommande>) -> Result<Vec<Commande<F>>> {
        log_op_start!(
            OP_LIST,
            famille = F::NAME,
            statut = statut.map(StatutCommande::as_str)
        );
        let start = Instant::now();

        let commandes = Self::load_all(conn, statut).map_err(|e| {
            log_op_error!(
                OP_LIST,
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                famille = F::NAME
            );
            e
        })?;

        log_op_end!(
            OP_LIST,
            duration_ms = start.elapsed().as_millis() as u64,
            famille = F::NAME,
            count = commandes.len() as u64
        );

        Ok(commandes)
    }

    // ---- statements ----

    fn ensure_new(commande: &Commande<F>) -> Result<()> {
        match commande.id {
            Some(commande_id) => Err(MagasinError::CommandeAlreadyPersisted {
                famille: F::NAME.to_string(),
                commande_id,
            }
            .into()),
            None => Ok(()),
        }
    }

    fn write_new(conn: &Connection, commande: &Commande<F>) -> Result<Assigned> {
        let sql = format!(
            "INSERT INTO {} (statut, magasinier_id, {}, local_id, creer_a, confirmer_a)
             VALUES (?1, ?2, ?3, ?4, {}, ?5)
             RETURNING id, creer_a",
            F::PARENT_TABLE,
            F::COUNTERPART_COLUMN,
            NOW_MS
        );

        let (id, creer_a): (i64, i64) = conn
            .query_row(
                &sql,
                params![
                    commande.statut.as_str(),
                    commande.magasinier_id,
                    commande.contrepartie_id,
                    commande.local_id,
                    commande.confirmer_a.as_ref().map(to_millis),
                ],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(from_rusqlite)?;

        let articles = apply_plan(conn, id, &[], &commande.articles)?;
        let locaux = apply_plan(conn, id, &[], &commande.locaux)?;

        Ok(Assigned {
            id,
            creer_a: Some(from_millis(creer_a).map_err(from_rusqlite)?),
            mise_a_jour_a: None,
            articles,
            locaux,
        })
    }

    fn write_update(conn: &Connection, id: i64, commande: &Commande<F>) -> Result<Assigned> {
        let sql = format!(
            "UPDATE {} SET
                statut = ?1,
                magasinier_id = ?2,
                {} = ?3,
                local_id = ?4,
                confirmer_a = COALESCE(?5, confirmer_a),
                mise_a_jour_a = MAX({}, creer_a)
             WHERE id = ?6
             RETURNING mise_a_jour_a",
            F::PARENT_TABLE,
            F::COUNTERPART_COLUMN,
            NOW_MS
        );

        let mise_a_jour_a: Option<i64> = conn
            .query_row(
                &sql,
                params![
                    commande.statut.as_str(),
                    commande.magasinier_id,
                    commande.contrepartie_id,
                    commande.local_id,
                    commande.confirmer_a.as_ref().map(to_millis),
                    id,
                ],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;

        let mise_a_jour_a = mise_a_jour_a.ok_or_else(|| MagasinError::CommandeNotFound {
            famille: F::NAME.to_string(),
            commande_id: id,
        })?;

        let stored_articles = child_ids::<F::LigneArticle>(conn, id)?;
        let articles = apply_plan(conn, id, &stored_articles, &commande.articles)?;

        let stored_locaux = child_ids::<F::LigneLocal>(conn, id)?;
        let locaux = apply_plan(conn, id, &stored_locaux, &commande.locaux)?;

        Ok(Assigned {
            id,
            creer_a: None,
            mise_a_jour_a: Some(from_millis(mise_a_jour_a).map_err(from_rusqlite)?),
            articles,
            locaux,
        })
    }

    fn delete_rows(conn: &Connection, id: i64) -> Result<bool> {
        for (table, parent_column) in [
            (
                <F::LigneArticle as ChildTable>::TABLE,
                <F::LigneArticle as ChildTable>::PARENT_COLUMN,
            ),
            (
                <F::LigneLocal as ChildTable>::TABLE,
                <F::LigneLocal as ChildTable>::PARENT_COLUMN,
            ),
        ] {
            let removed = conn
                .execute(
                    &format!("DELETE FROM {} WHERE {} = ?1", table, parent_column),
                    [id],
                )
                .map_err(from_rusqlite)?;
            tracing::debug!(
                table,
                commande_id = id,
                removed = removed as u64,
                "children deleted"
            );
        }

        let removed = conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1", F::PARENT_TABLE),
                [id],
            )
            .map_err(from_rusqlite)?;

        Ok(removed > 0)
    }

    fn load(conn: &Connection, id: i64) -> Result<Option<Commande<F>>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            parent_columns::<F>(),
            F::PARENT_TABLE
        );
        let parent = conn
            .query_row(&sql, [id], parent_from_row::<F>)
            .optional()
            .map_err(from_rusqlite)?;

        let Some(mut commande) = parent else {
            return Ok(None);
        };
        commande.articles = load_children(conn, id)?;
        commande.locaux = load_children(conn, id)?;

        Ok(Some(commande))
    }

    fn load_all(conn: &Connection, statut: Option<&StatutCommande>) -> Result<Vec<Commande<F>>> {
        let (sql, params): (String, Vec<Value>) = match statut {
            Some(statut) => (
                format!(
                    "SELECT id FROM {} WHERE statut = ?1 ORDER BY id",
                    F::PARENT_TABLE
                ),
                vec![Value::Text(statut.as_str().to_string())],
            ),
            None => (
                format!("SELECT id FROM {} ORDER BY id", F::PARENT_TABLE),
                Vec::new(),
            ),
        };

        let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;
        let ids = stmt
            .query_map(params_from_iter(params), |row| row.get::<_, i64>(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        let mut commandes = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(commande) = Self::load(conn, id)? {
                commandes.push(commande);
            }
        }
        Ok(commandes)
    }
}

/// Roll back after a failed write, keeping the original error
fn rollback(tx: Transaction<'_>, op: &'static str, err: ExError) -> ExError {
    tracing::warn!(op, err_code = err.code(), "rolling back transaction");
    if let Err(rollback_err) = tx.rollback() {
        tracing::warn!(op, error = %rollback_err, "rollback failed");
    }
    err
}

fn parent_columns<F: FamilyTables>() -> String {
    format!(
        "id, statut, magasinier_id, {}, local_id, creer_a, confirmer_a, mise_a_jour_a",
        F::COUNTERPART_COLUMN
    )
}

fn parent_from_row<F: FamilyTables>(row: &Row<'_>) -> rusqlite::Result<Commande<F>> {
    let statut: String = row.get("statut")?;
    Ok(Commande {
        id: Some(row.get("id")?),
        statut: StatutCommande::from(statut),
        magasinier_id: row.get("magasinier_id")?,
        contrepartie_id: row.get(F::COUNTERPART_COLUMN)?,
        local_id: row.get("local_id")?,
        creer_a: Some(get_datetime(row, "creer_a")?),
        confirmer_a: get_opt_datetime(row, "confirmer_a")?,
        mise_a_jour_a: get_opt_datetime(row, "mise_a_jour_a")?,
        articles: Vec::new(),
        locaux: Vec::new(),
    })
}

fn child_ids<C: ChildTable>(conn: &Connection, commande_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT id FROM {} WHERE {} = ?1 ORDER BY id",
            C::TABLE,
            C::PARENT_COLUMN
        ))
        .map_err(from_rusqlite)?;
    let ids = stmt
        .query_map([commande_id], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<i64>, _>>()
        .map_err(from_rusqlite)?;
    Ok(ids)
}

fn load_children<C: ChildTable>(conn: &Connection, commande_id: i64) -> Result<Vec<C>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM {} WHERE {} = ?1 ORDER BY id",
            C::select_columns(),
            C::TABLE,
            C::PARENT_COLUMN
        ))
        .map_err(from_rusqlite)?;
    let children = stmt
        .query_map([commande_id], C::from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(children)
}

/// Bring one child table in line with `desired`
///
/// Returns the row ids assigned to newly inserted children.
fn apply_plan<C: ChildTable>(
    conn: &Connection,
    commande_id: i64,
    stored: &[i64],
    desired: &[C],
) -> Result<Vec<(usize, i64)>> {
    let plan = plan(C::TABLE, commande_id, stored, desired)?;
    tracing::debug!(
        table = C::TABLE,
        commande_id,
        to_insert = plan.to_insert.len() as u64,
        to_update = plan.to_update.len() as u64,
        to_delete = plan.to_delete.len() as u64,
        "reconcile plan"
    );

    for row_id in &plan.to_delete {
        conn.execute(
            &format!(
                "DELETE FROM {} WHERE id = ?1 AND {} = ?2",
                C::TABLE,
                C::PARENT_COLUMN
            ),
            [*row_id, commande_id],
        )
        .map_err(from_rusqlite)?;
    }

    for (index, row_id) in &plan.to_update {
        update_child(conn, commande_id, *row_id, &desired[*index])?;
    }

    let mut inserted = Vec::with_capacity(plan.to_insert.len());
    for index in &plan.to_insert {
        let row_id = insert_child(conn, commande_id, &desired[*index])?;
        inserted.push((*index, row_id));
    }

    Ok(inserted)
}

fn insert_child<C: ChildTable>(conn: &Connection, commande_id: i64, child: &C) -> Result<i64> {
    let placeholders: Vec<String> = (2..=C::DATA_COLUMNS.len() + 1)
        .map(|i| format!("?{}", i))
        .collect();
    let sql = format!(
        "INSERT INTO {} ({}, {}) VALUES (?1, {}) RETURNING id",
        C::TABLE,
        C::PARENT_COLUMN,
        C::DATA_COLUMNS.join(", "),
        placeholders.join(", ")
    );

    let mut values = vec![Value::Integer(commande_id)];
    values.extend(child.data_values());

    conn.query_row(&sql, params_from_iter(values), |row| row.get(0))
        .map_err(from_rusqlite)
}

fn update_child<C: ChildTable>(
    conn: &Connection,
    commande_id: i64,
    row_id: i64,
    child: &C,
) -> Result<()> {
    let assignments: Vec<String> = C::DATA_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ?{}", column, i + 1))
        .collect();
    let n = C::DATA_COLUMNS.len();
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{} AND {} = ?{}",
        C::TABLE,
        assignments.join(", "),
        n + 1,
        C::PARENT_COLUMN,
        n + 2
    );

    let mut values = child.data_values();
    values.push(Value::Integer(row_id));
    values.push(Value::Integer(commande_id));

    let changed = conn
        .execute(&sql, params_from_iter(values))
        .map_err(from_rusqlite)?;
    if changed == 0 {
        return Err(MagasinError::UnknownChildRow {
            table: C::TABLE.to_string(),
            commande_id,
            row_id,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::apply_migrations;
    use magasin_core::model::{CommandeExterneArticle, CommandeInterneArticle};

    fn setup_test_db() -> Connection {
        let mut conn = crate::db::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        conn.execute_batch(
            "INSERT INTO magasinier (nom, nom_utilisateur, mot_de_passe_hash, created_at)
                 VALUES ('Ana', 'ana', 'h', 0);
             INSERT INTO consommateur (nom) VALUES ('Atelier');
             INSERT INTO fournisseur (nom, created_at, updated_at) VALUES ('Acme', 0, 0);
             INSERT INTO local (nom, created_at, updated_at) VALUES ('Réserve', 0, 0);
             INSERT INTO article (nom, created_at, updated_at) VALUES ('Vis', 0, 0);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_insert_child_binds_parent_first() {
        let conn = setup_test_db();
        conn.execute(
            "INSERT INTO commande_externe (statut, magasinier_id, fournisseur_id, local_id, creer_a)
             VALUES ('En attente', 1, 1, 1, 0)",
            [],
        )
        .unwrap();

        let row_id = insert_child(&conn, 1, &CommandeExterneArticle::new(1, 4)).unwrap();

        let (parent, quantite): (i64, i64) = conn
            .query_row(
                "SELECT commande_externe_id, quantite FROM commande_externe_article WHERE id = ?1",
                [row_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!((parent, quantite), (1, 4));
    }

    #[test]
    fn test_update_child_scoped_to_owning_order() {
        let conn = setup_test_db();
        conn.execute_batch(
            "INSERT INTO commande_interne (statut, magasinier_id, consommateur_id, local_id, creer_a)
                 VALUES ('En attente', 1, 1, 1, 0);
             INSERT INTO commande_interne (statut, magasinier_id, consommateur_id, local_id, creer_a)
                 VALUES ('En attente', 1, 1, 1, 0);",
        )
        .unwrap();
        let row_id = insert_child(&conn, 1, &CommandeInterneArticle::new(1, 1)).unwrap();

        let err = update_child(&conn, 2, row_id, &CommandeInterneArticle::new(1, 9)).unwrap_err();

        assert_eq!(
            err.kind(),
            magasin_core::errors::ExErrorKind::InvariantViolation
        );
    }

    #[test]
    fn test_parent_update_clamps_to_creation_time() {
        let mut conn = setup_test_db();
        // A creation stamp far in the future forces the clamp
        let future = Utc::now().timestamp_millis() + 86_400_000;
        conn.execute(
            "INSERT INTO commande_interne (statut, magasinier_id, consommateur_id, local_id, creer_a)
             VALUES ('En attente', 1, 1, 1, ?1)",
            [future],
        )
        .unwrap();

        let mut commande = OrderRepo::<Interne>::get_by_id(&conn, 1).unwrap().unwrap();
        OrderRepo::<Interne>::update(&mut conn, &mut commande).unwrap();

        assert_eq!(commande.mise_a_jour_a, commande.creer_a);
    }
}
