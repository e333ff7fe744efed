//! Domain models and types for the flattening pipeline.
//!
//! This module contains the core domain models shared by the flattener and
//! the processing stages.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`UserId`], [`ResourceId`])
//! - **Table shapes** ([`FlatRecord`], [`FlatTable`], [`DailyAggregate`], [`RiskScoreTable`])
//! - **The resource kind tag** ([`ResourceKind`])
//! - **Error types** ([`VeneerError`], [`FirestoreError`], [`MalformedResourceError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers use the newtype pattern so user and resource ids cannot be
//! mixed up:
//!
//! ```rust
//! use veneer::domain::{UserId, ResourceId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let user_id = UserId::new("user-123")?;
//! let resource_id = ResourceId::new("obs-456")?;
//!
//! // This won't compile - type safety prevents mixing ids
//! // let wrong: UserId = resource_id;  // Compile error!
//! # Ok(())
//! # }
//! ```
//!
//! # Value Semantics
//!
//! A [`FlatTable`] is immutable once built: every processing stage takes a
//! table by reference and returns a new table or aggregate, so pipelines
//! compose safely and can be re-run for idempotence.

pub mod aggregate;
pub mod errors;
pub mod ids;
pub mod kind;
pub mod record;
pub mod result;
pub mod table;

// Re-export commonly used types for convenience
pub use aggregate::{DailyAggregate, DailyRow, RiskScoreRow, RiskScoreTable};
pub use errors::{FirestoreError, MalformedResourceError, VeneerError};
pub use ids::{ResourceId, UserId};
pub use kind::ResourceKind;
pub use record::{CellValue, FlatRecord, FlatRecordBuilder};
pub use result::Result;
pub use table::FlatTable;
