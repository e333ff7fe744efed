//! Flattening
//!
//! Turns a batch of raw FHIR documents of one resource kind into one flat
//! table plus a batch report. The per-kind extraction rules live in
//! [`crate::adapters::fhir`]; this module drives them over a batch and
//! applies the last-write-wins duplicate merge.

pub mod flattener;
pub mod report;

pub use flattener::Flattener;
pub use report::{FlatReport, MalformedDocument};
