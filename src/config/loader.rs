//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::VeneerConfig;
use super::secret::secret_string;
use crate::domain::errors::VeneerError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into VeneerConfig
/// 4. Applies environment variable overrides (VENEER_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use veneer::config::load_config;
///
/// let config = load_config("veneer.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<VeneerConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(VeneerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        VeneerError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    // Perform environment variable substitution
    let contents = substitute_env_vars(&contents)?;

    let mut config: VeneerConfig = toml::from_str(&contents)
        .map_err(|e| VeneerError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        VeneerError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(VeneerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the VENEER_* prefix
///
/// Environment variables follow the pattern: VENEER_<SECTION>_<KEY>
/// For example: VENEER_FIRESTORE_PROJECT_ID, VENEER_EXPORT_OUTPUT_DIR
fn apply_env_overrides(config: &mut VeneerConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("VENEER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("VENEER_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Firestore overrides
    if let Ok(val) = std::env::var("VENEER_FIRESTORE_BASE_URL") {
        config.firestore.base_url = val;
    }
    if let Ok(val) = std::env::var("VENEER_FIRESTORE_PROJECT_ID") {
        config.firestore.project_id = val;
    }
    if let Ok(val) = std::env::var("VENEER_FIRESTORE_COLLECTION") {
        config.firestore.collection = val;
    }
    if let Ok(val) = std::env::var("VENEER_FIRESTORE_SUB_COLLECTION") {
        config.firestore.sub_collection = val;
    }
    if let Ok(val) = std::env::var("VENEER_FIRESTORE_TOKEN") {
        config.firestore.token = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("VENEER_FIRESTORE_PAGE_SIZE") {
        if let Ok(size) = val.parse() {
            config.firestore.page_size = size;
        }
    }

    // Export overrides
    if let Ok(val) = std::env::var("VENEER_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("VENEER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("VENEER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
