//! External data boundaries.
//!
//! This module holds the code that understands shapes the core does not:
//!
//! - [`fhir`] - Per-kind resource model adapters (raw FHIR JSON to flat records)
//! - [`firestore`] - Firestore REST retrieval and the document source seam
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external formats and
//! enable testing with local fixtures. Retrieval is abstracted behind the
//! [`firestore::DocumentSource`] trait so the same pipeline runs against
//! the live backend or a local JSON file:
//!
//! ```rust,no_run
//! use veneer::adapters::firestore::{DocumentSource, LocalFileSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = LocalFileSource::new("observations.json");
//! let documents = source.fetch_documents().await?;
//! println!("Fetched {} documents from {}", documents.len(), source.describe());
//! # Ok(())
//! # }
//! ```

pub mod fhir;
pub mod firestore;
