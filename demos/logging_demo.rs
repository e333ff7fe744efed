//! Example demonstrating the Veneer logging system
//!
//! This example shows how to:
//! - Initialize structured logging
//! - Use logging macros
//! - Emit structured fields alongside messages
//!
//! Run with:
//! ```bash
//! cargo run --example logging_demo
//! ```

use std::time::Duration;
use veneer::config::LoggingConfig;
use veneer::domain::{ResourceKind, UserId};
use veneer::logging::init_logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create a logging configuration
    let config = LoggingConfig {
        local_enabled: true,
        local_path: "/tmp/veneer_example".to_string(),
        local_rotation: "daily".to_string(),
        local_max_size_mb: 100,
    };

    // Initialize logging (keep the guard alive for the duration of the program)
    let _guard = init_logging("info", &config)?;

    // Log some basic messages
    tracing::info!("Veneer logging example started");
    tracing::debug!("This is a debug message");
    tracing::warn!("This is a warning message");

    // Use structured logging with fields
    tracing::info!(
        version = "1.0.0",
        environment = "development",
        "Application initialized"
    );

    // Demonstrate pipeline logging macros
    veneer::log_pipeline_start!(ResourceKind::Observation, "local file observations.json");

    // Simulate some work
    std::thread::sleep(Duration::from_millis(100));

    let user_id = UserId::new("user-12345")?;
    tracing::info!(user_id = %user_id, documents = 50, "Fetched user documents");

    std::thread::sleep(Duration::from_millis(100));

    // Log completion
    let duration = Duration::from_millis(200);
    veneer::log_pipeline_complete!(100, duration);

    // Demonstrate error logging
    let error = veneer::domain::VeneerError::Configuration("Example error".to_string());
    veneer::log_error_with_context!(&error, "Demonstrating error logging");

    tracing::info!("Veneer logging example completed");

    println!("\nLogging example completed successfully!");
    println!("Check logs in: /tmp/veneer_example/veneer.log");
    println!("Logs are in JSON format for production use");

    Ok(())
}
