//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        // load_config validates on load; a returned config is a valid one
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("Configuration is valid");
                c
            }
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Firestore Project: {}", config.firestore.project_id);
        println!(
            "  Collection: {}/{{user}}/{}",
            config.firestore.collection, config.firestore.sub_collection
        );
        println!("  Resource Kind: {}", config.flatten.kind);
        println!(
            "  Code Filter: {}",
            if config.flatten.code_filter.is_empty() {
                "all codes".to_string()
            } else {
                config.flatten.code_filter.join(", ")
            }
        );
        println!("  Reducers: {} codes mapped", config.processing.reducers.len());
        println!("  Output Directory: {}", config.export.output_dir);
        println!();
        Ok(0)
    }
}
