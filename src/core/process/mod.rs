//! Processing stages
//!
//! Pure transformations over flat tables and daily aggregates. Every
//! stage takes its input by reference and returns a new value plus a
//! [`ProcessReport`], so stages compose into pipelines and can be re-run
//! without side effects.

pub mod activity;
pub mod aggregate;
pub mod filter;
pub mod report;
pub mod score;

pub use activity::{activity_index, ActivityWeights};
pub use aggregate::{aggregate_daily, default_reducers, ReducerKind, ReducerMap};
pub use filter::{filter_by_range, ValueRange};
pub use report::{OmittedGroup, ProcessReport};
pub use score::{score_questionnaire, Rubric, RubricRegistry};
