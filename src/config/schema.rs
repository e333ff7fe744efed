//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the TOML
//! file. Each section owns its own validation.

use crate::config::SecretString;
use crate::core::process::{default_reducers, ActivityWeights, ReducerMap, ValueRange};
use crate::domain::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main pipeline configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VeneerConfig {
    /// Application-level settings
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Firestore retrieval configuration
    pub firestore: FirestoreConfig,

    /// Flattening configuration
    pub flatten: FlattenConfig,

    /// Processing stage configuration
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// CSV export configuration
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VeneerConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.firestore.validate(&self.environment)?;
        self.flatten.validate()?;
        self.processing.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (fetch and flatten but don't write any files)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Firestore retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirestoreConfig {
    /// Base URL of the Firestore REST API
    #[serde(default = "default_firestore_base_url")]
    pub base_url: String,

    /// Google Cloud project id
    pub project_id: String,

    /// Firestore database id
    #[serde(default = "default_database")]
    pub database: String,

    /// Top-level collection holding one document per user
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Per-user sub-collection holding the raw FHIR resources
    pub sub_collection: String,

    /// OAuth2 bearer token for the REST API (optional in development)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Documents per page when listing
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl FirestoreConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.project_id.is_empty() {
            return Err("firestore.project_id cannot be empty".to_string());
        }
        if self.sub_collection.is_empty() {
            return Err("firestore.sub_collection cannot be empty".to_string());
        }
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("firestore.base_url is not a valid URL: {}", e))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err("firestore.base_url must use http:// or https://".to_string());
        }
        if !(1..=1000).contains(&self.page_size) {
            return Err(format!(
                "firestore.page_size must be between 1 and 1000, got {}",
                self.page_size
            ));
        }

        // Production runs always authenticate over TLS
        if *environment == Environment::Production {
            if self
                .token
                .as_ref()
                .map(|t| t.expose_secret().is_empty())
                .unwrap_or(true)
            {
                return Err(
                    "firestore.token is required in production environments".to_string()
                );
            }
            if !self.base_url.starts_with("https://") {
                return Err(
                    "firestore.base_url must use https:// in production environments".to_string(),
                );
            }
        }
        Ok(())
    }
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_firestore_base_url(),
            project_id: String::new(),
            database: default_database(),
            collection: default_collection(),
            sub_collection: String::new(),
            token: None,
            timeout_seconds: default_timeout_seconds(),
            page_size: default_page_size(),
            retry: RetryConfig::default(),
        }
    }
}

/// Flattening configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlattenConfig {
    /// Resource kind to flatten (observation or questionnaire_response)
    pub kind: ResourceKind,

    /// Keep only documents whose primary code is in this set (empty = all)
    #[serde(default)]
    pub code_filter: Vec<String>,

    /// Coding system preferred when a document carries several codings
    #[serde(default = "default_preferred_coding_system")]
    pub preferred_coding_system: String,

    /// Maps questionnaire item link ids to readable column names
    #[serde(default)]
    pub question_labels: HashMap<String, String>,

    /// Maps questionnaire canonical URLs to display titles
    #[serde(default)]
    pub questionnaire_titles: HashMap<String, String>,
}

impl FlattenConfig {
    fn validate(&self) -> Result<(), String> {
        if self.preferred_coding_system.is_empty() {
            return Err("flatten.preferred_coding_system cannot be empty".to_string());
        }
        if self.code_filter.iter().any(String::is_empty) {
            return Err("flatten.code_filter entries cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            kind: ResourceKind::Observation,
            code_filter: Vec::new(),
            preferred_coding_system: default_preferred_coding_system(),
            question_labels: HashMap::new(),
            questionnaire_titles: HashMap::new(),
        }
    }
}

/// Processing stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Per-code reducer selection for daily aggregation
    #[serde(default = "default_reducers")]
    pub reducers: ReducerMap,

    /// Optional plausibility band applied before aggregation
    #[serde(default)]
    pub value_range: Option<ValueRange>,

    /// Activity-index weights
    #[serde(default)]
    pub activity: ActivityWeights,
}

impl ProcessingConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(range) = &self.value_range {
            if let (Some(lower), Some(upper)) = (range.lower, range.upper) {
                if lower > upper {
                    return Err(format!(
                        "processing.value_range lower bound {lower} exceeds upper bound {upper}"
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            reducers: default_reducers(),
            value_range: None,
            activity: ActivityWeights::default(),
        }
    }
}

/// CSV export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory the CSV files are written into
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_dir.is_empty() {
            return Err("export.output_dir cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily or size)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Maximum log file size in MB
    #[serde(default = "default_local_max_size_mb")]
    pub local_max_size_mb: usize,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "size"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_max_size_mb == 0 {
            return Err("logging.local_max_size_mb must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
            local_max_size_mb: default_local_max_size_mb(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_firestore_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_collection() -> String {
    "users".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_page_size() -> usize {
    300
}

fn default_preferred_coding_system() -> String {
    "http://loinc.org".to_string()
}

fn default_output_dir() -> String {
    "out".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_local_max_size_mb() -> usize {
    100
}
