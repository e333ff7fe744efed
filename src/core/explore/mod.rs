//! Exploration
//!
//! Read-only selection over flat tables: narrow to a set of users, an
//! inclusive date range, and numeric value bounds, without mutating the
//! source table. Plotting stays outside this crate; the explorer produces
//! the table a renderer or exporter would consume.

use crate::domain::{FlatTable, Result, UserId, VeneerError};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

/// A declarative subset of a flat table
///
/// All criteria are optional and conjunctive. An empty selection passes
/// every row through.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    user_ids: Option<HashSet<UserId>>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    y_lower: Option<f64>,
    y_upper: Option<f64>,
}

impl Selection {
    /// Creates a selection that keeps every row
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the selection to the given users
    pub fn with_user_ids(mut self, user_ids: impl IntoIterator<Item = UserId>) -> Self {
        self.user_ids = Some(user_ids.into_iter().collect());
        self
    }

    /// Restricts the selection to dates on or after `start`
    pub fn with_start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Restricts the selection to dates on or before `end`
    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Restricts numeric values to the inclusive `[lower, upper]` band
    ///
    /// Non-numeric rows are unaffected.
    pub fn with_y_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.y_lower = Some(lower);
        self.y_upper = Some(upper);
        self
    }

    /// Applies the selection to a table, producing a new table
    ///
    /// # Errors
    ///
    /// Returns [`VeneerError::EmptySelection`] when no row survives,
    /// since every downstream consumer of a selection needs data.
    pub fn select(&self, table: &FlatTable) -> Result<FlatTable> {
        let selected = table.retain_rows(|record| {
            if let Some(user_ids) = &self.user_ids {
                if !user_ids.contains(&record.user_id) {
                    return false;
                }
            }
            let date = record.effective_date();
            if let Some(start) = self.start_date {
                if date < start {
                    return false;
                }
            }
            if let Some(end) = self.end_date {
                if date > end {
                    return false;
                }
            }
            if let Some(value) = record.value.as_number() {
                if let Some(lower) = self.y_lower {
                    if value < lower {
                        return false;
                    }
                }
                if let Some(upper) = self.y_upper {
                    if value > upper {
                        return false;
                    }
                }
            }
            true
        });

        if selected.is_empty() {
            return Err(VeneerError::EmptySelection(format!(
                "no rows of {} match the selection",
                table.kind()
            )));
        }

        tracing::debug!(
            kind = %table.kind(),
            input_rows = table.len(),
            selected_rows = selected.len(),
            "Selection applied"
        );
        Ok(selected)
    }
}

/// Record counts per `(code, user_id)` group, in sorted order
///
/// The overview a quick data-quality check wants before any processing:
/// which metrics exist, for whom, and how many samples each has.
pub fn record_counts(table: &FlatTable) -> Vec<(String, UserId, usize)> {
    let mut counts: BTreeMap<(String, UserId), usize> = BTreeMap::new();
    for record in table.rows() {
        *counts
            .entry((record.code.clone(), record.user_id.clone()))
            .or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|((code, user_id), count)| (code, user_id, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CellValue, FlatRecord, ResourceId, ResourceKind};
    use chrono::{TimeZone, Utc};

    fn record(user: &str, id: &str, day: u32, code: &str, value: f64) -> FlatRecord {
        FlatRecord::builder()
            .user_id(UserId::new(user).unwrap())
            .resource_id(ResourceId::new(id).unwrap())
            .effective_datetime(Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap())
            .code(code)
            .value(CellValue::Number(value))
            .build()
            .unwrap()
    }

    fn sample_table() -> FlatTable {
        FlatTable::from_rows(
            ResourceKind::Observation,
            vec![
                record("u1", "r1", 1, "55423-8", 100.0),
                record("u1", "r2", 2, "55423-8", 250.0),
                record("u2", "r3", 3, "8867-4", 70.0),
            ],
        )
    }

    #[test]
    fn test_empty_selection_keeps_everything() {
        let table = sample_table();
        let selected = Selection::new().select(&table).unwrap();
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_user_filter() {
        let table = sample_table();
        let selected = Selection::new()
            .with_user_ids([UserId::new("u2").unwrap()])
            .select(&table)
            .unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.rows()[0].user_id.as_str(), "u2");
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let table = sample_table();
        let selected = Selection::new()
            .with_start_date("2024-01-02".parse().unwrap())
            .with_end_date("2024-01-03".parse().unwrap())
            .select(&table)
            .unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_y_bounds_inclusive() {
        let table = sample_table();
        let selected = Selection::new()
            .with_y_bounds(100.0, 250.0)
            .select(&table)
            .unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_no_match_is_an_error() {
        let table = sample_table();
        let result = Selection::new()
            .with_user_ids([UserId::new("nobody").unwrap()])
            .select(&table);
        assert!(matches!(result, Err(VeneerError::EmptySelection(_))));
    }

    #[test]
    fn test_source_table_unchanged() {
        let table = sample_table();
        let _ = Selection::new()
            .with_user_ids([UserId::new("u1").unwrap()])
            .select(&table)
            .unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_record_counts() {
        let table = sample_table();
        let counts = record_counts(&table);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].0, "55423-8");
        assert_eq!(counts[0].2, 2);
        assert_eq!(counts[1].0, "8867-4");
        assert_eq!(counts[1].2, 1);
    }
}
