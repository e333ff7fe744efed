//! Flattening batch report
//!
//! Per-batch accounting for the flattener. Errors local to one document are
//! absorbed here (count + identifier) instead of failing the batch, and the
//! report is always returned alongside the table so callers can inspect
//! what was skipped.

use serde::Serialize;

/// One document skipped because a required field was missing
#[derive(Debug, Clone, Serialize)]
pub struct MalformedDocument {
    /// Position of the document in the input sequence
    pub index: usize,

    /// The document's resource id, when one could be extracted
    pub resource_id: Option<String>,

    /// Why the document was skipped
    pub reason: String,
}

/// Summary of one flattening run
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlatReport {
    /// Total number of documents in the input batch
    pub total_documents: usize,

    /// Documents that produced records
    pub flattened: usize,

    /// Documents skipped by the code filter (a normal outcome)
    pub filtered_out: usize,

    /// Earlier documents replaced by a later duplicate
    pub duplicates_replaced: usize,

    /// Documents skipped because a required field was missing
    pub malformed: Vec<MalformedDocument>,
}

impl FlatReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document skipped as malformed
    pub fn add_malformed(
        &mut self,
        index: usize,
        resource_id: Option<String>,
        reason: impl Into<String>,
    ) {
        self.malformed.push(MalformedDocument {
            index,
            resource_id,
            reason: reason.into(),
        });
    }

    /// Number of malformed documents
    pub fn malformed_count(&self) -> usize {
        self.malformed.len()
    }

    /// True if no document was skipped as malformed
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty()
    }

    /// Log the report
    pub fn log_summary(&self) {
        tracing::info!(
            total_documents = self.total_documents,
            flattened = self.flattened,
            filtered_out = self.filtered_out,
            duplicates_replaced = self.duplicates_replaced,
            malformed = self.malformed.len(),
            "Flattening completed"
        );

        for doc in &self.malformed {
            tracing::warn!(
                index = doc.index,
                resource_id = doc.resource_id.as_deref().unwrap_or("<unknown>"),
                reason = %doc.reason,
                "Skipped malformed document"
            );
        }
    }
}
