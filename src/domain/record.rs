//! Flat record domain model
//!
//! One row of the canonical table. A record carries the identifying fields
//! shared by every resource kind plus a kind-dependent payload: a numeric
//! quantity with a unit for most observations, a categorical value for
//! string/boolean observations, and per-question answer columns for
//! questionnaire responses.

use super::ids::{ResourceId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The payload of a single table cell
///
/// Numeric and categorical values are kept distinct so aggregation stages
/// can safely skip non-numeric rows instead of coercing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A numeric quantity
    Number(f64),
    /// A categorical string value
    Text(String),
    /// A boolean answer
    Bool(bool),
}

impl CellValue {
    /// Returns the numeric value, if this cell is numeric
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True if this cell holds a numeric value
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// One row of the canonical flat table
///
/// # Examples
///
/// ```
/// use veneer::domain::record::{CellValue, FlatRecordBuilder};
/// use veneer::domain::ids::{ResourceId, UserId};
/// use chrono::Utc;
///
/// let record = FlatRecordBuilder::new()
///     .user_id(UserId::new("user-1").unwrap())
///     .resource_id(ResourceId::new("obs-1").unwrap())
///     .effective_datetime(Utc::now())
///     .code("55423-8")
///     .display("Number of steps")
///     .value(CellValue::Number(870.0))
///     .unit("steps")
///     .build()
///     .unwrap();
/// assert_eq!(record.code, "55423-8");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    /// Subject this record belongs to
    pub user_id: UserId,

    /// Source document id within its resource kind
    pub resource_id: ResourceId,

    /// Clinically relevant time of the observation/response
    pub effective_datetime: DateTime<Utc>,

    /// Coding-system identifier disambiguating the metric
    /// (LOINC code for observations, questionnaire identifier for responses)
    pub code: String,

    /// Human-readable label for `code`
    pub display: String,

    /// The value payload
    pub value: CellValue,

    /// Unit for quantity values; empty otherwise
    pub unit: String,

    /// Kind-specific extra columns, keyed by column name
    ///
    /// For questionnaire responses these are the per-question answers keyed
    /// by link id. A BTreeMap keeps column order deterministic.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, CellValue>,
}

impl FlatRecord {
    /// Creates a new builder for constructing a FlatRecord
    pub fn builder() -> FlatRecordBuilder {
        FlatRecordBuilder::default()
    }

    /// The calendar date of the effective time (UTC)
    pub fn effective_date(&self) -> chrono::NaiveDate {
        self.effective_datetime.date_naive()
    }
}

/// Builder for constructing FlatRecord instances
#[derive(Debug, Default)]
pub struct FlatRecordBuilder {
    user_id: Option<UserId>,
    resource_id: Option<ResourceId>,
    effective_datetime: Option<DateTime<Utc>>,
    code: Option<String>,
    display: Option<String>,
    value: Option<CellValue>,
    unit: Option<String>,
    extra: BTreeMap<String, CellValue>,
}

impl FlatRecordBuilder {
    /// Creates a new FlatRecordBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the user id
    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Sets the resource id
    pub fn resource_id(mut self, resource_id: ResourceId) -> Self {
        self.resource_id = Some(resource_id);
        self
    }

    /// Sets the effective datetime
    pub fn effective_datetime(mut self, effective_datetime: DateTime<Utc>) -> Self {
        self.effective_datetime = Some(effective_datetime);
        self
    }

    /// Sets the code
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the display label
    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Sets the value
    pub fn value(mut self, value: CellValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the unit
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Adds one extra column
    pub fn extra_column(mut self, name: impl Into<String>, value: CellValue) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    /// Builds the FlatRecord
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is missing
    pub fn build(self) -> Result<FlatRecord, String> {
        Ok(FlatRecord {
            user_id: self.user_id.ok_or("user_id is required")?,
            resource_id: self.resource_id.ok_or("resource_id is required")?,
            effective_datetime: self
                .effective_datetime
                .ok_or("effective_datetime is required")?,
            code: self.code.ok_or("code is required")?,
            display: self.display.unwrap_or_default(),
            value: self.value.ok_or("value is required")?,
            unit: self.unit.unwrap_or_default(),
            extra: self.extra,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> FlatRecord {
        FlatRecordBuilder::new()
            .user_id(UserId::new("user-1").unwrap())
            .resource_id(ResourceId::new("obs-1").unwrap())
            .effective_datetime(Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap())
            .code("8867-4")
            .display("Heart rate")
            .value(CellValue::Number(72.0))
            .unit("beats/minute")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_complete() {
        let record = sample_record();
        assert_eq!(record.user_id.as_str(), "user-1");
        assert_eq!(record.value.as_number(), Some(72.0));
        assert_eq!(record.unit, "beats/minute");
    }

    #[test]
    fn test_builder_missing_field() {
        let result = FlatRecordBuilder::new()
            .user_id(UserId::new("user-1").unwrap())
            .build();

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("resource_id is required"));
    }

    #[test]
    fn test_builder_defaults_display_and_unit() {
        let record = FlatRecordBuilder::new()
            .user_id(UserId::new("user-1").unwrap())
            .resource_id(ResourceId::new("qr-1").unwrap())
            .effective_datetime(Utc::now())
            .code("PHQ-9")
            .value(CellValue::Number(4.0))
            .build()
            .unwrap();

        assert!(record.display.is_empty());
        assert!(record.unit.is_empty());
    }

    #[test]
    fn test_effective_date() {
        let record = sample_record();
        assert_eq!(record.effective_date().to_string(), "2024-01-15");
    }

    #[test]
    fn test_cell_value_numeric() {
        assert!(CellValue::Number(1.5).is_numeric());
        assert!(!CellValue::Text("high".to_string()).is_numeric());
        assert_eq!(CellValue::Bool(true).as_number(), None);
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Number(400.0).to_string(), "400");
        assert_eq!(CellValue::Text("mild".to_string()).to_string(), "mild");
        assert_eq!(CellValue::Bool(false).to_string(), "false");
    }

    #[test]
    fn test_extra_columns_ordered() {
        let record = FlatRecordBuilder::new()
            .user_id(UserId::new("user-1").unwrap())
            .resource_id(ResourceId::new("qr-1").unwrap())
            .effective_datetime(Utc::now())
            .code("PHQ-9")
            .value(CellValue::Number(0.0))
            .extra_column("q2", CellValue::from("Several days"))
            .extra_column("q1", CellValue::from("Not at all"))
            .build()
            .unwrap();

        let keys: Vec<&str> = record.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["q1", "q2"]);
    }

    #[test]
    fn test_record_serialization_round_trip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let deserialized: FlatRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deserialized);
    }
}
