//! Batch flattener
//!
//! Drives the resource model adapters over an ordered batch of raw
//! documents, producing one flat table plus a batch report. Duplicate
//! documents (same subject and resource id) are expected from incremental
//! re-syncs; the most recently processed one wins and replaces the earlier
//! document's records entirely.

use super::report::FlatReport;
use crate::adapters::fhir::{adapt_document, AdapterOptions, Extraction};
use crate::domain::{FlatRecord, FlatTable, ResourceId, ResourceKind, UserId};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Flattens batches of raw resource documents of one kind
///
/// # Examples
///
/// ```
/// use veneer::core::flatten::Flattener;
/// use veneer::domain::ResourceKind;
/// use serde_json::json;
///
/// let documents = vec![json!({
///     "resourceType": "Observation",
///     "id": "obs-1",
///     "subject": {"reference": "Patient/user-1"},
///     "effectiveDateTime": "2024-01-01T08:00:00Z",
///     "code": {"coding": [{"system": "http://loinc.org", "code": "55423-8", "display": "Number of steps"}]},
///     "valueQuantity": {"value": 870.0, "unit": "steps"}
/// })];
///
/// let flattener = Flattener::new(ResourceKind::Observation);
/// let (table, report) = flattener.flatten(&documents);
/// assert_eq!(table.len(), 1);
/// assert!(report.is_clean());
/// ```
#[derive(Debug, Clone)]
pub struct Flattener {
    kind: ResourceKind,
    code_filter: Option<HashSet<String>>,
    preferred_system: Option<String>,
    question_labels: Option<HashMap<String, String>>,
    questionnaire_titles: Option<HashMap<String, String>>,
}

impl Flattener {
    /// Creates a flattener for one resource kind
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            code_filter: None,
            preferred_system: None,
            question_labels: None,
            questionnaire_titles: None,
        }
    }

    /// Restricts flattening to the given codes
    pub fn with_code_filter(mut self, codes: impl IntoIterator<Item = String>) -> Self {
        self.code_filter = Some(codes.into_iter().collect());
        self
    }

    /// Sets the coding system preferred when a resource carries multiple codings
    pub fn with_preferred_system(mut self, system: impl Into<String>) -> Self {
        self.preferred_system = Some(system.into());
        self
    }

    /// Sets the link-id to question-text mapping used for questionnaire columns
    pub fn with_question_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.question_labels = Some(labels);
        self
    }

    /// Sets the questionnaire canonical-url to title mapping
    pub fn with_questionnaire_titles(mut self, titles: HashMap<String, String>) -> Self {
        self.questionnaire_titles = Some(titles);
        self
    }

    /// Flattens an ordered batch of raw documents into one table
    ///
    /// Rows come out in document-processing order; callers sort explicitly
    /// before relying on temporal order. A malformed document is skipped
    /// and recorded in the report; the batch never aborts. An empty batch
    /// yields an empty table with the kind's base schema.
    pub fn flatten(&self, documents: &[Value]) -> (FlatTable, FlatReport) {
        let mut report = FlatReport::new();
        report.total_documents = documents.len();

        let options = AdapterOptions {
            code_filter: self.code_filter.as_ref(),
            preferred_system: self.preferred_system.as_deref(),
            question_labels: self.question_labels.as_ref(),
            questionnaire_titles: self.questionnaire_titles.as_ref(),
        };

        // Record groups in processing order, keyed by (user_id, resource_id).
        // A later duplicate clears the earlier slot and appends at its own
        // position, so last-write-wins holds regardless of input ordering.
        let mut groups: Vec<Option<Vec<FlatRecord>>> = Vec::new();
        let mut index_by_key: HashMap<(UserId, ResourceId), usize> = HashMap::new();

        for (index, document) in documents.iter().enumerate() {
            match adapt_document(document, self.kind, &options) {
                Ok(Extraction::Records(records)) => {
                    report.flattened += 1;
                    let Some(first) = records.first() else {
                        continue;
                    };
                    let key = (first.user_id.clone(), first.resource_id.clone());
                    if let Some(&slot) = index_by_key.get(&key) {
                        groups[slot] = None;
                        report.duplicates_replaced += 1;
                        tracing::debug!(
                            user_id = %key.0,
                            resource_id = %key.1,
                            "Duplicate document replaced by later copy"
                        );
                    }
                    index_by_key.insert(key, groups.len());
                    groups.push(Some(records));
                }
                Ok(Extraction::FilteredOut) => {
                    report.filtered_out += 1;
                }
                Err(err) => {
                    let resource_id = document
                        .get("id")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    report.add_malformed(index, resource_id, err.to_string());
                }
            }
        }

        let rows: Vec<FlatRecord> = groups.into_iter().flatten().flatten().collect();
        let table = if rows.is_empty() {
            FlatTable::empty(self.kind)
        } else {
            FlatTable::from_rows(self.kind, rows)
        };

        (table, report)
    }
}
