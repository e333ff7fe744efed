// Veneer - FHIR Health Data Flattening Pipeline
// Copyright (c) 2026 Veneer Contributors
// Licensed under the MIT License

//! # Veneer - FHIR Health Data Flattening Pipeline
//!
//! Veneer pulls raw FHIR resources written by mobile health studies into
//! Firestore, flattens them into analysis-friendly tables, and derives
//! daily aggregates and questionnaire risk scores.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Fetching** raw Observation and QuestionnaireResponse documents
//!   from Firestore (or a local JSON file)
//! - **Flattening** them into one flat table per resource kind, with
//!   malformed documents reported instead of aborting the batch
//! - **Processing** flat tables: plausibility filtering, daily
//!   aggregation, an activity index, and questionnaire scoring
//! - **Exporting** every table shape as CSV
//!
//! ## Architecture
//!
//! Veneer follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pipeline logic (flatten, process, explore, export)
//! - [`adapters`] - External boundaries (FHIR extraction, Firestore)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use veneer::core::flatten::Flattener;
//! use veneer::core::process::{aggregate_daily, default_reducers};
//! use veneer::domain::ResourceKind;
//!
//! # fn example(documents: Vec<serde_json::Value>) {
//! let flattener = Flattener::new(ResourceKind::Observation)
//!     .with_code_filter(["55423-8".to_string()]);
//!
//! let (table, report) = flattener.flatten(&documents);
//! report.log_summary();
//!
//! let (daily, _) = aggregate_daily(&table, &default_reducers());
//! for row in daily.rows() {
//!     println!("{} {} {} = {}", row.user_id, row.date, row.code, row.value);
//! }
//! # }
//! ```
//!
//! ## Value Semantics
//!
//! Tables are immutable once built. Every processing stage takes its
//! input by reference and returns a new table or aggregate together with
//! a report of what it skipped, so pipelines compose and re-running a
//! stage is always safe.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
