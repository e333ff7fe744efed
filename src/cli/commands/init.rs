//! Init command implementation
//!
//! Generates a starter configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "veneer.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your study settings", self.output);
                println!("  2. Set VENEER_FIRESTORE_TOKEN with a bearer token");
                println!("  3. Validate configuration: veneer validate-config");
                println!("  4. Run the pipeline: veneer flatten");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Veneer Configuration File
# FHIR health data flattening pipeline

[application]
log_level = "info"
dry_run = false

[firestore]
project_id = "my-study"
sub_collection = "HealthKit"
token = "${VENEER_FIRESTORE_TOKEN}"

[flatten]
kind = "observation"

[export]
output_dir = "out"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Veneer Configuration File
# FHIR health data flattening pipeline

# Runtime environment: development, staging, production
# Production enforces https and a bearer token
environment = "development"

[application]
# Log level: trace, debug, info, warn, error
log_level = "info"
# Fetch and flatten but don't write any files
dry_run = false

[firestore]
# base_url = "https://firestore.googleapis.com/v1"
project_id = "my-study"
# database = "(default)"
# collection = "users"
sub_collection = "HealthKit"
token = "${VENEER_FIRESTORE_TOKEN}"
# timeout_seconds = 30
# page_size = 300

[flatten]
# Resource kind: observation or questionnaire_response
kind = "observation"
# Keep only documents with these primary codes (empty = all)
code_filter = ["55423-8", "8867-4"]
# preferred_coding_system = "http://loinc.org"

# Readable column names for questionnaire items
# [flatten.question_labels]
# "69725-0" = "feeling_down"

# Titles for questionnaire canonical URLs
# [flatten.questionnaire_titles]
# "http://example.org/fhir/Questionnaire/phq-9" = "PHQ-9"

[processing]
# Plausibility band applied before aggregation
# value_range = { lower = 0.0, upper = 50000.0 }

# Per-code daily reducers: sum or mean
[processing.reducers]
"55423-8" = "sum"   # step count
"8867-4" = "mean"   # heart rate
"29463-7" = "mean"  # body weight

[processing.activity]
steps_weight = 0.7
heart_rate_weight = 0.3

[export]
output_dir = "out"

[logging]
local_enabled = true
local_path = "logs"
local_rotation = "daily"
"#
        .to_string()
    }
}
