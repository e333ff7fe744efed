//! Configuration management for the pipeline.
//!
//! TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Configuration supports:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Environment variable overrides (`VENEER_*` prefix)
//! - Default values for optional settings
//! - Per-section validation
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use veneer::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("veneer.toml")?;
//!
//! println!("Project: {}", config.firestore.project_id);
//! println!("Kind: {}", config.flatten.kind);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [firestore]
//! project_id = "demo-study"
//! sub_collection = "HealthKit"
//! token = "${VENEER_FIRESTORE_TOKEN}"
//!
//! [flatten]
//! kind = "observation"
//! code_filter = ["55423-8", "8867-4"]
//!
//! [processing.reducers]
//! "55423-8" = "sum"
//! "8867-4" = "mean"
//!
//! [export]
//! output_dir = "out"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, Environment, ExportConfig, FirestoreConfig, FlattenConfig, LoggingConfig,
    ProcessingConfig, RetryConfig, VeneerConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
