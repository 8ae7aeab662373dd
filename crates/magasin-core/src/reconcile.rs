//! Child-collection reconciliation planning
//!
//! Turns the desired in-memory child collection of an order and the row ids
//! currently stored for it into three disjoint sets of work:
//!
//! - `to_insert`: positions of children carrying no row id
//! - `to_update`: positions (and ids) of children whose row id is stored
//! - `to_delete`: stored row ids no child carries any more
//!
//! Matching is by stored row identity only. Two lines for the same article
//! are two distinct rows.

#![allow(clippy::result_large_err)]

use std::collections::BTreeSet;

use crate::errors::{ExError, MagasinError};
use crate::model::OrderChild;

/// Work needed to make stored child rows match an in-memory collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Indexes into the desired collection
    pub to_insert: Vec<usize>,
    /// (index into the desired collection, stored row id)
    pub to_update: Vec<(usize, i64)>,
    /// Stored row ids, ascending
    pub to_delete: Vec<i64>,
}

impl ReconcilePlan {
    pub fn is_noop(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Compute the reconciliation plan for one child table of one order
///
/// # Errors
///
/// - `InvariantViolation` if a child carries a row id that is not stored for
///   this order, or if two children carry the same row id
pub fn plan<C: OrderChild>(
    table: &str,
    commande_id: i64,
    stored_ids: &[i64],
    desired: &[C],
) -> Result<ReconcilePlan, ExError> {
    let stored: BTreeSet<i64> = stored_ids.iter().copied().collect();
    let mut kept: BTreeSet<i64> = BTreeSet::new();
    let mut result = ReconcilePlan::default();

    for (index, child) in desired.iter().enumerate() {
        match child.row_id() {
            None => result.to_insert.push(index),
            Some(row_id) => {
                if !stored.contains(&row_id) {
                    return Err(MagasinError::UnknownChildRow {
                        table: table.to_string(),
                        commande_id,
                        row_id,
                    }
                    .into());
                }
                if !kept.insert(row_id) {
                    return Err(MagasinError::DuplicateChildRow {
                        table: table.to_string(),
                        commande_id,
                        row_id,
                    }
                    .into());
                }
                result.to_update.push((index, row_id));
            }
        }
    }

    result.to_delete = stored.difference(&kept).copied().collect();

    Ok(result)
}
