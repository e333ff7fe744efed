//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Veneer - FHIR health data flattening pipeline
#[derive(Parser, Debug)]
#[command(name = "veneer")]
#[command(version, about, long_about = None)]
#[command(author = "Veneer Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "veneer.toml", env = "VENEER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "VENEER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, flatten, process and export one resource kind
    Flatten(commands::flatten::FlattenArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_flatten() {
        let cli = Cli::parse_from(["veneer", "flatten"]);
        assert_eq!(cli.config, "veneer.toml");
        assert!(matches!(cli.command, Commands::Flatten(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["veneer", "--config", "custom.toml", "flatten"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["veneer", "--log-level", "debug", "flatten"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["veneer", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["veneer", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_cli_parse_flatten_with_input() {
        let cli = Cli::parse_from(["veneer", "flatten", "--input", "docs.json", "--dry-run"]);
        if let Commands::Flatten(args) = cli.command {
            assert_eq!(args.input.as_deref(), Some("docs.json"));
            assert!(args.dry_run);
        } else {
            panic!("Expected flatten command");
        }
    }
}
