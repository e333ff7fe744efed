//! Calendar-day aggregation
//!
//! Groups rows by `(user_id, calendar date, code)` and reduces the values
//! with a metric-specific reducer: sum for cumulative counts (step count),
//! mean for instantaneous measures (heart rate). The reducer choice is a
//! property of the code and comes from a caller-supplied mapping, never a
//! global default. Groups with zero rows are absent, not zero-filled.

use super::report::ProcessReport;
use crate::domain::{DailyAggregate, DailyRow, FlatTable, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How values within a daily group are reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReducerKind {
    /// Sum the values (cumulative metrics such as step count)
    Sum,
    /// Average the values (instantaneous metrics such as heart rate)
    Mean,
}

/// Mapping from metric code to reducer kind
pub type ReducerMap = HashMap<String, ReducerKind>;

/// The default reducer mapping for the metrics this pipeline serves
///
/// Callers with other metrics supply their own mapping; nothing falls back
/// to a global default reducer.
pub fn default_reducers() -> ReducerMap {
    let mut reducers = ReducerMap::new();
    // Step count is cumulative across the day
    reducers.insert("55423-8".to_string(), ReducerKind::Sum);
    // Active energy burned is cumulative
    reducers.insert("41981-2".to_string(), ReducerKind::Sum);
    // Heart rate is instantaneous
    reducers.insert("8867-4".to_string(), ReducerKind::Mean);
    // Oxygen saturation is instantaneous
    reducers.insert("59408-5".to_string(), ReducerKind::Mean);
    // Body weight is instantaneous
    reducers.insert("29463-7".to_string(), ReducerKind::Mean);
    reducers
}

/// Accumulator for one `(user_id, date, code)` group
struct GroupAccumulator {
    sum: f64,
    count: usize,
    display: String,
    unit: String,
}

/// Aggregates a flat table into one row per `(user_id, date, code)` group
///
/// Rows with non-numeric values, and rows whose code has no entry in the
/// reducer mapping, are omitted and counted in the report. The result is
/// independent of input ordering: groups come out sorted by
/// `(user_id, date, code)`.
pub fn aggregate_daily(table: &FlatTable, reducers: &ReducerMap) -> (DailyAggregate, ProcessReport) {
    let mut report = ProcessReport::new();
    report.input_rows = table.len();

    let mut groups: BTreeMap<(UserId, NaiveDate, String), GroupAccumulator> = BTreeMap::new();

    for row in table.rows() {
        let Some(value) = row.value.as_number() else {
            report.skipped_non_numeric += 1;
            continue;
        };
        if !reducers.contains_key(&row.code) {
            report.skipped_unmapped_code += 1;
            tracing::debug!(code = %row.code, "No reducer mapped for code, row omitted");
            continue;
        }

        let key = (row.user_id.clone(), row.effective_date(), row.code.clone());
        let entry = groups.entry(key).or_insert_with(|| GroupAccumulator {
            sum: 0.0,
            count: 0,
            display: row.display.clone(),
            unit: row.unit.clone(),
        });
        entry.sum += value;
        entry.count += 1;
    }

    let rows: Vec<DailyRow> = groups
        .into_iter()
        .map(|((user_id, date, code), acc)| {
            let value = match reducers[&code] {
                ReducerKind::Sum => acc.sum,
                ReducerKind::Mean => acc.sum / acc.count as f64,
            };
            DailyRow {
                user_id,
                date,
                code,
                display: acc.display,
                value,
                unit: acc.unit,
                sample_count: acc.count,
            }
        })
        .collect();

    report.output_rows = rows.len();
    (DailyAggregate::from_rows(rows), report)
}
