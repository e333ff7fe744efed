//! Range filtering
//!
//! Drops rows whose numeric value falls outside a caller-specified
//! interval. Bounds are inclusive; an unset bound means no limit on that
//! side. Rows with categorical values pass through untouched, and the
//! stage is idempotent.

use crate::domain::FlatTable;
use serde::{Deserialize, Serialize};

/// An inclusive numeric interval with optional bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Inclusive lower bound; `None` means unbounded below
    pub lower: Option<f64>,

    /// Inclusive upper bound; `None` means unbounded above
    pub upper: Option<f64>,
}

impl ValueRange {
    /// Creates a range with both bounds set
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Creates a range bounded only from above
    pub fn at_most(upper: f64) -> Self {
        Self {
            lower: None,
            upper: Some(upper),
        }
    }

    /// Creates a range bounded only from below
    pub fn at_least(lower: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
        }
    }

    /// True if the value lies inside the range (bounds inclusive)
    pub fn contains(&self, value: f64) -> bool {
        if let Some(lower) = self.lower {
            if value < lower {
                return false;
            }
        }
        if let Some(upper) = self.upper {
            if value > upper {
                return false;
            }
        }
        true
    }
}

/// Returns a new table without the numeric rows outside the range
///
/// Categorical and boolean rows are retained unconditionally.
pub fn filter_by_range(table: &FlatTable, range: &ValueRange) -> FlatTable {
    let filtered = table.retain_rows(|row| match row.value.as_number() {
        Some(value) => range.contains(value),
        None => true,
    });

    tracing::debug!(
        input_rows = table.len(),
        output_rows = filtered.len(),
        lower = ?range.lower,
        upper = ?range.upper,
        "Range filter applied"
    );

    filtered
}
