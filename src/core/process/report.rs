//! Processing stage report
//!
//! Per-stage accounting. Groups omitted for missing inputs are recorded
//! here (never silently dropped), and counts of rows a stage could not use
//! are kept so callers can audit what a pipeline did.

use crate::domain::UserId;
use chrono::NaiveDate;
use serde::Serialize;

/// One group omitted from a stage's result
#[derive(Debug, Clone, Serialize)]
pub struct OmittedGroup {
    /// Subject of the omitted group
    pub user_id: UserId,

    /// Date of the omitted group, when the grouping is daily
    pub date: Option<NaiveDate>,

    /// Why the group was omitted
    pub detail: String,
}

/// Summary of one processing stage
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessReport {
    /// Rows the stage received
    pub input_rows: usize,

    /// Rows the stage produced
    pub output_rows: usize,

    /// Rows skipped because their value is not numeric
    pub skipped_non_numeric: usize,

    /// Rows skipped because no reducer is mapped for their code
    pub skipped_unmapped_code: usize,

    /// Groups omitted for missing required inputs
    pub omitted: Vec<OmittedGroup>,
}

impl ProcessReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an omitted group
    pub fn add_omitted(
        &mut self,
        user_id: UserId,
        date: Option<NaiveDate>,
        detail: impl Into<String>,
    ) {
        self.omitted.push(OmittedGroup {
            user_id,
            date,
            detail: detail.into(),
        });
    }

    /// True if nothing was skipped or omitted
    pub fn is_clean(&self) -> bool {
        self.skipped_non_numeric == 0
            && self.skipped_unmapped_code == 0
            && self.omitted.is_empty()
    }

    /// Log the report
    pub fn log_summary(&self, stage: &str) {
        tracing::info!(
            stage,
            input_rows = self.input_rows,
            output_rows = self.output_rows,
            skipped_non_numeric = self.skipped_non_numeric,
            skipped_unmapped_code = self.skipped_unmapped_code,
            omitted_groups = self.omitted.len(),
            "Processing stage completed"
        );

        for group in &self.omitted {
            tracing::warn!(
                stage,
                user_id = %group.user_id,
                date = group.date.map(|d| d.to_string()).as_deref().unwrap_or("-"),
                detail = %group.detail,
                "Group omitted"
            );
        }
    }
}
