//! Flat table domain model
//!
//! An ordered collection of [`FlatRecord`]s sharing one schema. The column
//! list is explicit data, not compile-time struct fields, so a new survey
//! instrument needs no rebuild: the base columns come from the table's
//! resource kind and any extra columns observed in the rows are appended in
//! sorted order at construction time.
//!
//! Tables have value semantics. Every processing stage takes a table by
//! reference and returns a new one; nothing mutates a table in place after
//! construction.

use super::ids::UserId;
use super::kind::ResourceKind;
use super::record::FlatRecord;
use crate::domain::errors::VeneerError;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An ordered collection of flat records sharing one schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatTable {
    kind: ResourceKind,
    columns: Vec<String>,
    rows: Vec<FlatRecord>,
}

impl FlatTable {
    /// Creates an empty table with the base schema of the given kind
    pub fn empty(kind: ResourceKind) -> Self {
        Self {
            kind,
            columns: kind.base_columns().iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Creates a table from rows, establishing the column schema
    ///
    /// The schema is the kind's base columns followed by the union of all
    /// extra column names observed in the rows, in sorted order.
    pub fn from_rows(kind: ResourceKind, rows: Vec<FlatRecord>) -> Self {
        let mut columns: Vec<String> =
            kind.base_columns().iter().map(|c| c.to_string()).collect();

        let extra: BTreeSet<&String> = rows.iter().flat_map(|r| r.extra.keys()).collect();
        columns.extend(extra.into_iter().cloned());

        Self { kind, columns, rows }
    }

    /// The resource kind this table is tagged with
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The table's column names, in schema order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The table's rows, in their current order
    pub fn rows(&self) -> &[FlatRecord] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns a new table with rows stably sorted by `(user_id, effective_datetime)`
    pub fn sorted_by_user_and_time(&self) -> FlatTable {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| {
            a.user_id
                .cmp(&b.user_id)
                .then(a.effective_datetime.cmp(&b.effective_datetime))
        });
        Self {
            kind: self.kind,
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Returns a new table holding only rows accepted by the predicate
    ///
    /// The schema is carried over unchanged.
    pub fn retain_rows<F>(&self, mut predicate: F) -> FlatTable
    where
        F: FnMut(&FlatRecord) -> bool,
    {
        Self {
            kind: self.kind,
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    /// Checks that this table is of the expected kind
    ///
    /// # Errors
    ///
    /// Returns [`VeneerError::SchemaMismatch`] if the kinds differ
    pub fn require_kind(&self, expected: ResourceKind) -> Result<()> {
        if self.kind != expected {
            return Err(VeneerError::SchemaMismatch {
                expected,
                actual: self.kind,
            });
        }
        Ok(())
    }

    /// The distinct user ids in the table, in first-seen order
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut seen = BTreeSet::new();
        let mut ids = Vec::new();
        for row in &self.rows {
            if seen.insert(row.user_id.clone()) {
                ids.push(row.user_id.clone());
            }
        }
        ids
    }

    /// The distinct codes in the table, in first-seen order
    pub fn codes(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut codes = Vec::new();
        for row in &self.rows {
            if seen.insert(row.code.clone()) {
                codes.push(row.code.clone());
            }
        }
        codes
    }
}
