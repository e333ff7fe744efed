//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted file logs
//! - Configurable log levels
//! - Local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use veneer::logging::init_logging;
//! use veneer::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a pipeline run
///
/// # Example
///
/// ```no_run
/// use veneer::log_pipeline_start;
/// use veneer::domain::ResourceKind;
///
/// log_pipeline_start!(ResourceKind::Observation, "local file observations.json");
/// ```
#[macro_export]
macro_rules! log_pipeline_start {
    ($kind:expr, $source:expr) => {
        tracing::info!(
            kind = %$kind,
            source = %$source,
            "Starting pipeline run"
        );
    };
}

/// Log the completion of a pipeline run
///
/// # Example
///
/// ```no_run
/// use veneer::log_pipeline_complete;
/// use std::time::Duration;
///
/// let rows = 42;
/// let duration = Duration::from_secs(3);
/// log_pipeline_complete!(rows, duration);
/// ```
#[macro_export]
macro_rules! log_pipeline_complete {
    ($rows:expr, $duration:expr) => {
        tracing::info!(
            rows = $rows,
            duration_ms = $duration.as_millis(),
            "Pipeline run completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use veneer::log_error_with_context;
/// use veneer::domain::VeneerError;
///
/// let error = VeneerError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
