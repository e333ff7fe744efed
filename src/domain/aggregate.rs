//! Derived table shapes
//!
//! The daily aggregate keyed by `(user_id, date)` and the questionnaire
//! risk-score table. Both are distinct, simplified shapes produced by
//! processing stages; they are not flat tables and never flow back into
//! the flattener.

use super::ids::{ResourceId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One aggregated value for a `(user_id, date, code)` group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    /// Subject the aggregate belongs to
    pub user_id: UserId,

    /// Calendar date (UTC) of the underlying rows
    pub date: NaiveDate,

    /// Metric code the value was reduced for
    pub code: String,

    /// Human-readable label carried over from the source rows
    pub display: String,

    /// The reduced numeric value
    pub value: f64,

    /// Unit carried over from the source rows
    pub unit: String,

    /// Number of source rows that went into the reduction
    pub sample_count: usize,
}

/// Derived table keyed by `(user_id, date)`, one row per metric
///
/// Groups with zero underlying rows are simply absent; the aggregate is
/// never zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    rows: Vec<DailyRow>,
}

impl DailyAggregate {
    /// Creates an aggregate from rows
    pub fn from_rows(rows: Vec<DailyRow>) -> Self {
        Self { rows }
    }

    /// The aggregate's rows
    pub fn rows(&self) -> &[DailyRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the aggregate has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up the value for a `(user_id, date, code)` group
    pub fn value_for(&self, user_id: &UserId, date: NaiveDate, code: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| &r.user_id == user_id && r.date == date && r.code == code)
            .map(|r| r.value)
    }

    /// The distinct codes present, in sorted order
    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.rows.iter().map(|r| r.code.clone()).collect();
        codes.sort();
        codes.dedup();
        codes
    }
}

/// One scored questionnaire response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScoreRow {
    /// Subject the score belongs to
    pub user_id: UserId,

    /// The scored response document
    pub resource_id: ResourceId,

    /// When the response was authored
    pub effective_datetime: DateTime<Utc>,

    /// Questionnaire title the rubric was looked up by
    pub questionnaire: String,

    /// Total score under the rubric
    pub score: f64,

    /// Severity label from the rubric's cutoffs
    pub interpretation: String,
}

/// Scored questionnaire responses, one row per response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskScoreTable {
    rows: Vec<RiskScoreRow>,
}

impl RiskScoreTable {
    /// Creates a score table from rows
    pub fn from_rows(rows: Vec<RiskScoreRow>) -> Self {
        Self { rows }
    }

    /// The table's rows
    pub fn rows(&self) -> &[RiskScoreRow] {
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
}
