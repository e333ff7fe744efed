//! Activity index
//!
//! A derived per-`(user_id, date)` metric combining the daily step-count
//! sum and heart-rate mean under a fixed weighted formula:
//!
//! ```text
//! index = steps_weight * (steps / 10_000) + heart_rate_weight * (heart_rate / 100)
//! ```
//!
//! where 10 000 steps and 100 beats/minute act as normalization scales.
//! A user-date missing either input cannot be scored; it is omitted from
//! the result and recorded in the report. The omission never fails the
//! whole call.

use super::report::ProcessReport;
use crate::domain::{DailyAggregate, DailyRow, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// LOINC code for daily step count
pub const STEP_COUNT_CODE: &str = "55423-8";

/// LOINC code for heart rate
pub const HEART_RATE_CODE: &str = "8867-4";

/// Code assigned to the derived activity-index rows
pub const ACTIVITY_INDEX_CODE: &str = "activity-index";

/// Normalization scale for the daily step sum
const STEPS_SCALE: f64 = 10_000.0;

/// Normalization scale for the heart-rate mean
const HEART_RATE_SCALE: f64 = 100.0;

/// Weights of the activity-index formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityWeights {
    /// Weight of the normalized step sum
    pub steps_weight: f64,

    /// Weight of the normalized heart-rate mean
    pub heart_rate_weight: f64,
}

impl Default for ActivityWeights {
    fn default() -> Self {
        Self {
            steps_weight: 0.7,
            heart_rate_weight: 0.3,
        }
    }
}

/// Computes the activity index per `(user_id, date)`
///
/// The input must already be aggregated daily (step-count sums and
/// heart-rate means). Returns a new aggregate holding one
/// [`ACTIVITY_INDEX_CODE`] row per scorable user-date, plus the report of
/// omitted groups.
pub fn activity_index(
    aggregate: &DailyAggregate,
    weights: &ActivityWeights,
) -> (DailyAggregate, ProcessReport) {
    let mut report = ProcessReport::new();
    report.input_rows = aggregate.len();

    // Collect the two inputs per user-date
    let mut inputs: BTreeMap<(UserId, NaiveDate), (Option<f64>, Option<f64>)> = BTreeMap::new();
    for row in aggregate.rows() {
        let entry = inputs
            .entry((row.user_id.clone(), row.date))
            .or_insert((None, None));
        match row.code.as_str() {
            STEP_COUNT_CODE => entry.0 = Some(row.value),
            HEART_RATE_CODE => entry.1 = Some(row.value),
            _ => {}
        }
    }

    let mut rows = Vec::new();
    for ((user_id, date), (steps, heart_rate)) in inputs {
        match (steps, heart_rate) {
            (Some(steps), Some(heart_rate)) => {
                let index = weights.steps_weight * (steps / STEPS_SCALE)
                    + weights.heart_rate_weight * (heart_rate / HEART_RATE_SCALE);
                rows.push(DailyRow {
                    user_id,
                    date,
                    code: ACTIVITY_INDEX_CODE.to_string(),
                    display: "Activity index".to_string(),
                    value: index,
                    unit: String::new(),
                    sample_count: 2,
                });
            }
            (steps, _) => {
                let missing = if steps.is_none() {
                    "missing step count"
                } else {
                    "missing heart rate"
                };
                report.add_omitted(user_id, Some(date), missing);
            }
        }
    }

    report.output_rows = rows.len();
    (DailyAggregate::from_rows(rows), report)
}
