//! Firestore REST API response models
//!
//! The REST API returns documents in Firestore's typed-value encoding
//! (`stringValue`, `integerValue`, `mapValue`, ...). The decoder here
//! lowers that encoding into plain JSON so the resource model adapters
//! see the same shape the client SDKs write.

use crate::domain::errors::FirestoreError;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One page of a document list response
#[derive(Debug, Deserialize)]
pub struct ListDocumentsResponse {
    /// Documents in this page
    #[serde(default)]
    pub documents: Vec<FirestoreDocument>,

    /// Token for the next page, absent on the last page
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// One document as returned by the REST API
#[derive(Debug, Deserialize)]
pub struct FirestoreDocument {
    /// Full resource name
    /// (`projects/{p}/databases/{d}/documents/{collection}/{id}`)
    pub name: String,

    /// Typed field map
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl FirestoreDocument {
    /// The document id, the last path segment of the resource name
    pub fn document_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Decodes the typed field map into a plain JSON object
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreError::InvalidResponse`] when a field does not
    /// follow the typed-value encoding.
    pub fn decode(&self) -> Result<Value, FirestoreError> {
        let mut object = Map::new();
        for (key, typed) in &self.fields {
            object.insert(key.clone(), decode_value(typed)?);
        }
        Ok(Value::Object(object))
    }
}

/// Lowers one Firestore typed value into plain JSON
fn decode_value(typed: &Value) -> Result<Value, FirestoreError> {
    let object = typed.as_object().ok_or_else(|| {
        FirestoreError::InvalidResponse(format!("expected a typed value, got {typed}"))
    })?;

    let (kind, inner) = object.iter().next().ok_or_else(|| {
        FirestoreError::InvalidResponse("empty typed value".to_string())
    })?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "stringValue" | "timestampValue" | "referenceValue" => Ok(inner.clone()),
        "integerValue" => {
            // Integers arrive as decimal strings
            let text = inner.as_str().ok_or_else(|| {
                FirestoreError::InvalidResponse(format!("integerValue is not a string: {inner}"))
            })?;
            let parsed: i64 = text.parse().map_err(|_| {
                FirestoreError::InvalidResponse(format!("invalid integerValue: {text}"))
            })?;
            Ok(Value::from(parsed))
        }
        "doubleValue" => Ok(inner.clone()),
        "mapValue" => {
            let fields = inner.get("fields").and_then(Value::as_object);
            let mut decoded = Map::new();
            if let Some(fields) = fields {
                for (key, value) in fields {
                    decoded.insert(key.clone(), decode_value(value)?);
                }
            }
            Ok(Value::Object(decoded))
        }
        "arrayValue" => {
            let values = inner.get("values").and_then(Value::as_array);
            let mut decoded = Vec::new();
            if let Some(values) = values {
                for value in values {
                    decoded.push(decode_value(value)?);
                }
            }
            Ok(Value::Array(decoded))
        }
        other => Err(FirestoreError::InvalidResponse(format!(
            "unsupported typed value kind: {other}"
        ))),
    }
}
