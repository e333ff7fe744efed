//! Core pipeline logic.
//!
//! # Modules
//!
//! - [`flatten`] - Raw document batches to flat tables, with batch reports
//! - [`process`] - Range filtering, daily aggregation, activity index, risk scoring
//! - [`explore`] - Read-only selection and record-count summaries
//! - [`export`] - CSV serialization of the pipeline's table shapes
//!
//! # Pipeline Workflow
//!
//! The typical run:
//!
//! 1. **Fetch**: Pull the raw document batch from a document source
//! 2. **Flatten**: One flat table per resource kind, malformed documents reported
//! 3. **Process**: Filter plausible values, aggregate daily, derive scores
//! 4. **Export**: Write the resulting tables as CSV
//!
//! # Example
//!
//! ```rust,no_run
//! use veneer::core::flatten::Flattener;
//! use veneer::core::process::{aggregate_daily, default_reducers};
//! use veneer::domain::ResourceKind;
//!
//! # fn example(documents: Vec<serde_json::Value>) {
//! let flattener = Flattener::new(ResourceKind::Observation);
//! let (table, report) = flattener.flatten(&documents);
//! report.log_summary();
//!
//! let (daily, stage_report) = aggregate_daily(&table, &default_reducers());
//! stage_report.log_summary("aggregate_daily");
//! println!("{} daily rows", daily.len());
//! # }
//! ```

pub mod explore;
pub mod export;
pub mod flatten;
pub mod process;
