//! FHIR resource model adapters
//!
//! One adapter per resource kind. Given one raw resource document (an
//! untyped nested JSON mapping) an adapter extracts the identifying fields
//! shared by every kind (subject, resource id, effective time, coding) and
//! the kind-specific payload, producing flat records or signalling that the
//! document should be skipped.
//!
//! A code-filter miss is a normal outcome, not an error; only missing
//! required fields raise [`MalformedResourceError`], and the flattener
//! absorbs those into its report instead of aborting the batch.

pub mod observation;
pub mod questionnaire;

use crate::domain::{MalformedResourceError, ResourceId, ResourceKind, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub use observation::adapt_observation;
pub use questionnaire::adapt_questionnaire_response;

/// The coding system preferred when a resource carries multiple codings
pub const LOINC_SYSTEM: &str = "http://loinc.org";

/// Outcome of adapting one raw document
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The document yielded flat records (one per value, or one per component)
    Records(Vec<crate::domain::FlatRecord>),
    /// The document's code is not in the caller's filter; skip silently
    FilteredOut,
}

/// Options shared by the adapters
///
/// All fields borrow from the caller; the flattener builds one of these per
/// batch from its configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterOptions<'a> {
    /// Acceptable codes; `None` means accept everything
    pub code_filter: Option<&'a HashSet<String>>,

    /// Coding system preferred when multiple codings exist
    /// (defaults to LOINC when `None`)
    pub preferred_system: Option<&'a str>,

    /// Link id to question text, used to enrich questionnaire column labels
    pub question_labels: Option<&'a HashMap<String, String>>,

    /// Questionnaire canonical url/identifier to display title
    pub questionnaire_titles: Option<&'a HashMap<String, String>>,
}

impl<'a> AdapterOptions<'a> {
    /// The effective preferred coding system
    pub fn preferred_system(&self) -> &str {
        self.preferred_system.unwrap_or(LOINC_SYSTEM)
    }

    /// True if the code passes the filter (or no filter is set)
    pub fn accepts_code(&self, code: &str) -> bool {
        match self.code_filter {
            Some(filter) => filter.contains(code),
            None => true,
        }
    }
}

/// Adapts one raw document according to its declared resource kind
///
/// # Errors
///
/// Returns [`MalformedResourceError`] if the document is missing a required
/// field (subject, resource id, effective time, code).
pub fn adapt_document(
    document: &Value,
    kind: ResourceKind,
    options: &AdapterOptions<'_>,
) -> Result<Extraction, MalformedResourceError> {
    match kind {
        ResourceKind::Observation => adapt_observation(document, options),
        ResourceKind::QuestionnaireResponse => adapt_questionnaire_response(document, options),
    }
}

/// Extracts the subject's user id from the document
///
/// Accepts both a full reference (`Patient/<id>`) and a bare id.
pub(crate) fn extract_user_id(document: &Value) -> Result<UserId, MalformedResourceError> {
    let reference = document
        .get("subject")
        .and_then(|s| s.get("reference").or_else(|| s.get("id")))
        .and_then(Value::as_str)
        .ok_or(MalformedResourceError::MissingSubject)?;

    let id = reference.strip_prefix("Patient/").unwrap_or(reference);
    UserId::new(id).map_err(|_| MalformedResourceError::MissingSubject)
}

/// Extracts the document's resource id
pub(crate) fn extract_resource_id(document: &Value) -> Result<ResourceId, MalformedResourceError> {
    let id = document
        .get("id")
        .and_then(Value::as_str)
        .ok_or(MalformedResourceError::MissingResourceId)?;

    ResourceId::new(id).map_err(|_| MalformedResourceError::MissingResourceId)
}

/// Parses a FHIR timestamp
///
/// Accepts RFC 3339 datetimes with any offset, and bare dates (interpreted
/// as midnight UTC).
pub(crate) fn parse_fhir_datetime(raw: &str) -> Result<DateTime<Utc>, MalformedResourceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = raw.parse::<NaiveDate>() {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
            MalformedResourceError::InvalidTimestamp(raw.to_string())
        })?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc));
    }
    Err(MalformedResourceError::InvalidTimestamp(raw.to_string()))
}

/// Picks the (code, display) pair from a FHIR `coding` array
///
/// When multiple codings exist the configured system wins; otherwise the
/// first coding is used.
pub(crate) fn pick_coding(
    codings: &[Value],
    preferred_system: &str,
) -> Option<(String, String)> {
    let chosen = codings
        .iter()
        .find(|c| c.get("system").and_then(Value::as_str) == Some(preferred_system))
        .or_else(|| codings.first())?;

    let code = chosen.get("code").and_then(Value::as_str)?.to_string();
    let display = chosen
        .get("display")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((code, display))
}
