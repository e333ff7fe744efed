//! Document source seam
//!
//! The flattener works over a batch of raw JSON documents and does not
//! care where they came from. `DocumentSource` abstracts between the
//! live Firestore client and a local JSON file, so offline runs and
//! tests use the same entry points as production.

use super::client::FirestoreClient;
use crate::domain::{Result, VeneerError};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A provider of raw FHIR documents
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetches the full ordered document batch
    async fn fetch_documents(&self) -> Result<Vec<Value>>;

    /// Human-readable description of where the documents come from
    fn describe(&self) -> String;
}

#[async_trait]
impl DocumentSource for FirestoreClient {
    async fn fetch_documents(&self) -> Result<Vec<Value>> {
        self.fetch_all_documents().await
    }

    fn describe(&self) -> String {
        format!("Firestore at {}", self.base_url())
    }
}

/// Reads a JSON array of raw resources from a local file
pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
    /// Creates a source backed by `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DocumentSource for LocalFileSource {
    async fn fetch_documents(&self) -> Result<Vec<Value>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            VeneerError::Io(format!("Failed to read {}: {e}", self.path.display()))
        })?;

        let parsed: Value = serde_json::from_str(&contents)?;
        match parsed {
            Value::Array(documents) => {
                tracing::info!(
                    path = %self.path.display(),
                    count = documents.len(),
                    "Loaded raw document batch from file"
                );
                Ok(documents)
            }
            _ => Err(VeneerError::Serialization(format!(
                "{} must contain a JSON array of resources",
                self.path.display()
            ))),
        }
    }

    fn describe(&self) -> String {
        format!("local file {}", self.path.display())
    }
}
