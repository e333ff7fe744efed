//! Firestore retrieval
//!
//! REST client, response decoding, and the document source seam used by
//! the CLI to swap the live backend for a local file.

pub mod client;
pub mod models;
pub mod source;

pub use client::FirestoreClient;
pub use models::{FirestoreDocument, ListDocumentsResponse};
pub use source::{DocumentSource, LocalFileSource};
