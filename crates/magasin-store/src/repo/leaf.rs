//! Generic repository for single-table entities
//!
//! Each leaf entity describes its table once through [`LeafTable`]; the
//! CRUD statements are generated from that description. Every operation is
//! a single statement, so it runs equally well on a plain connection or
//! inside a caller's transaction.

#![allow(clippy::result_large_err)]

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use magasin_core::errors::MagasinError;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

use crate::errors::{from_rusqlite, Result};
use crate::repo::timestamps::{from_millis, NOW_MS};

/// Which bookkeeping timestamps a table carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamps {
    None,
    /// `created_at` only
    Created,
    /// `created_at` and `updated_at`
    CreatedUpdated,
}

impl Timestamps {
    fn has_created(self) -> bool {
        !matches!(self, Timestamps::None)
    }

    fn has_updated(self) -> bool {
        matches!(self, Timestamps::CreatedUpdated)
    }
}

/// Mapping between a leaf entity and its table
pub trait LeafTable: Sized {
    const TABLE: &'static str;
    /// Columns written on insert and update, in `values()` order
    const COLUMNS: &'static [&'static str];
    /// Columns only ever read back (maintained by dedicated operations)
    const READ_ONLY: &'static [&'static str] = &[];
    const TIMESTAMPS: Timestamps;

    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: i64);
    fn values(&self) -> Vec<Value>;
    /// Build from a row selected with [`select_columns`]
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn set_created_at(&mut self, _at: DateTime<Utc>) {}
    fn set_updated_at(&mut self, _at: DateTime<Utc>) {}
}

/// Column list used by every SELECT on a leaf table
pub fn select_columns<T: LeafTable>() -> String {
    let mut columns = vec!["id"];
    columns.extend_from_slice(T::COLUMNS);
    columns.extend_from_slice(T::READ_ONLY);
    if T::TIMESTAMPS.has_created() {
        columns.push("created_at");
    }
    if T::TIMESTAMPS.has_updated() {
        columns.push("updated_at");
    }
    columns.join(", ")
}

/// CRUD over one leaf table
pub struct LeafRepo<T>(PhantomData<T>);

impl<T: LeafTable> LeafRepo<T> {
    /// Insert a new row, assigning identity and timestamps in memory
    pub fn insert(conn: &Connection, entity: &mut T) -> Result<i64> {
        if let Some(id) = entity.id() {
            return Err(MagasinError::EntityAlreadyPersisted {
                entity: T::TABLE.to_string(),
                id,
            }
            .into());
        }

        let mut columns: Vec<&str> = T::COLUMNS.to_vec();
        let mut placeholders: Vec<String> =
            (1..=T::COLUMNS.len()).map(|i| format!("?{}", i)).collect();
        if T::TIMESTAMPS.has_created() {
            columns.push("created_at");
            placeholders.push(NOW_MS.to_string());
        }
        if T::TIMESTAMPS.has_updated() {
            // Same statement, same instant: updated_at starts equal to created_at
            columns.push("updated_at");
            placeholders.push(NOW_MS.to_string());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            T::TABLE,
            columns.join(", "),
            placeholders.join(", "),
            returning_columns(T::TIMESTAMPS),
        );

        let (id, created_at, updated_at) = conn
            .query_row(&sql, params_from_iter(entity.values()), stamps_from_row)
            .map_err(from_rusqlite)?;

        entity.set_id(id);
        if let Some(at) = created_at {
            entity.set_created_at(at);
        }
        if let Some(at) = updated_at {
            entity.set_updated_at(at);
        }

        tracing::debug!(table = T::TABLE, id, "row inserted");
        Ok(id)
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<T>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            select_columns::<T>(),
            T::TABLE
        );

        conn.query_row(&sql, [id], T::from_row)
            .optional()
            .map_err(from_rusqlite)
    }

    /// Persist every mutable column and refresh `updated_at`
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the entity has no id
    /// - `NotFound` if no row carries the entity's id
    pub fn update(conn: &Connection, entity: &mut T) -> Result<()> {
        let id = entity.id().ok_or_else(|| MagasinError::EntityNotPersisted {
            entity: T::TABLE.to_string(),
        })?;

        let mut assignments: Vec<String> = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect();
        if T::TIMESTAMPS.has_updated() {
            assignments.push(format!("updated_at = MAX({}, created_at)", NOW_MS));
        }

        let id_param = T::COLUMNS.len() + 1;
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{} RETURNING {}",
            T::TABLE,
            assignments.join(", "),
            id_param,
            returning_columns(T::TIMESTAMPS),
        );

        let mut values = entity.values();
        values.push(Value::Integer(id));

        let stamps = conn
            .query_row(&sql, params_from_iter(values), stamps_from_row)
            .optional()
            .map_err(from_rusqlite)?;

        match stamps {
            Some((_, _, updated_at)) => {
                if let Some(at) = updated_at {
                    entity.set_updated_at(at);
                }
                Ok(())
            }
            None => Err(MagasinError::EntityNotFound {
                entity: T::TABLE.to_string(),
                id,
            }
            .into()),
        }
    }

    /// Remove a row; returns whether one existed
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let removed = conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1", T::TABLE), [id])
            .map_err(from_rusqlite)?;
        Ok(removed > 0)
    }

    /// All rows, ordered by id
    pub fn list(conn: &Connection) -> Result<Vec<T>> {
        Self::query(
            conn,
            &format!("SELECT {} FROM {} ORDER BY id", select_columns::<T>(), T::TABLE),
            Vec::new(),
        )
    }

    pub(crate) fn query(conn: &Connection, sql: &str, params: Vec<Value>) -> Result<Vec<T>> {
        let mut stmt = conn.prepare(sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(params_from_iter(params), T::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }
}

fn returning_columns(timestamps: Timestamps) -> &'static str {
    match timestamps {
        Timestamps::None => "id, NULL, NULL",
        Timestamps::Created => "id, created_at, NULL",
        Timestamps::CreatedUpdated => "id, created_at, updated_at",
    }
}

type Stamps = (i64, Option<DateTime<Utc>>, Option<DateTime<Utc>>);

fn stamps_from_row(row: &Row<'_>) -> rusqlite::Result<Stamps> {
    let created_at: Option<i64> = row.get(1)?;
    let updated_at: Option<i64> = row.get(2)?;
    Ok((
        row.get(0)?,
        created_at.map(from_millis).transpose()?,
        updated_at.map(from_millis).transpose()?,
    ))
}
