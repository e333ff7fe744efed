//! Domain error types
//!
//! Defines the error hierarchy for the pipeline. All errors are
//! domain-specific and don't expose third-party types.
//!
//! Two failure modes are deliberately *not* variants here:
//! malformed documents are absorbed into the flattening report
//! ([`MalformedResourceError`] is carried inside it), and per-group
//! insufficient-data omissions are carried in the processing report. Only
//! structurally invalid requests surface as [`VeneerError`].

use crate::domain::kind::ResourceKind;
use thiserror::Error;

/// Main pipeline error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum VeneerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Firestore retrieval errors
    #[error("Firestore error: {0}")]
    Firestore(#[from] FirestoreError),

    /// A kind-specific operation was applied to a table of the wrong kind
    #[error("Schema mismatch: operation requires a {expected} table, got {actual}")]
    SchemaMismatch {
        /// The resource kind the operation requires
        expected: ResourceKind,
        /// The resource kind of the table that was supplied
        actual: ResourceKind,
    },

    /// A required column is absent from the table's schema
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// No scoring rubric is registered for the requested questionnaire
    #[error("No rubric registered for questionnaire '{0}'")]
    UnknownQuestionnaire(String),

    /// A selection or export matched zero rows
    #[error("Empty selection: {0}")]
    EmptySelection(String),

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Firestore-specific errors
///
/// Errors that occur when talking to the Firestore REST API. These don't
/// expose the underlying HTTP client types.
#[derive(Debug, Error)]
pub enum FirestoreError {
    /// Failed to connect to Firestore
    #[error("Failed to connect to Firestore: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid response from the server
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Collection not found
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Per-document extraction failure
///
/// Raised by a resource model adapter when a raw document is missing a
/// required field. These never abort a batch; the flattener records them
/// (count + identifier) in its report and moves on.
#[derive(Debug, Clone, Error)]
pub enum MalformedResourceError {
    /// The raw document is not a JSON object
    #[error("Document is not a JSON object")]
    NotAnObject,

    /// The subject reference is missing or empty
    #[error("Missing subject reference")]
    MissingSubject,

    /// The document carries no id
    #[error("Missing resource id")]
    MissingResourceId,

    /// The effective time field is absent
    #[error("Missing effective time")]
    MissingEffectiveTime,

    /// The effective time could not be parsed
    #[error("Invalid effective time: {0}")]
    InvalidTimestamp(String),

    /// The coding array is missing or carries no usable code
    #[error("Missing code")]
    MissingCode,

    /// The document carries no value element the adapter understands
    #[error("Missing value")]
    MissingValue,
}

// Conversion from std::io::Error
impl From<std::io::Error> for VeneerError {
    fn from(err: std::io::Error) -> Self {
        VeneerError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for VeneerError {
    fn from(err: serde_json::Error) -> Self {
        VeneerError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for VeneerError {
    fn from(err: toml::de::Error) -> Self {
        VeneerError::Configuration(format!("TOML parse error: {err}"))
    }
}
