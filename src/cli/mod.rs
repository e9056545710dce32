//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for offboard using clap.
//!
//! Exit codes: 0 success, 2 configuration, 4 connection or authorization,
//! 5 fatal, 130 interrupted.

pub mod commands;

use crate::domain::OffboardError;
use clap::{Parser, Subcommand};

/// Offboard - export, retain and unlicense a departing user
#[derive(Parser, Debug)]
#[command(name = "offboard")]
#[command(version, about, long_about = None)]
#[command(author = "Offboard Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "offboard.toml", env = "OFFBOARD_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "OFFBOARD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Offboard a user: export, retain, revoke, clean up
    Run(commands::run::RunArgs),

    /// Show the status and manifest of one export
    Status(commands::status::StatusArgs),

    /// Purge the staging directory
    Cleanup(commands::cleanup::CleanupArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Process exit code for a failed command
pub fn exit_code(err: &OffboardError) -> i32 {
    match err {
        OffboardError::Configuration(_) | OffboardError::Validation(_) => 2,
        OffboardError::Connection(_) | OffboardError::Authorization(_) => 4,
        OffboardError::Cancelled(_) => 130,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransferError;
    use test_case::test_case;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["offboard", "run", "--user", "a@x.com", "--yes"]);
        assert_eq!(cli.config, "offboard.toml");
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.user.as_deref(), Some("a@x.com"));
                assert!(args.yes);
                assert!(!args.dry_run);
            }
            other => panic!("Expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["offboard", "--config", "custom.toml", "run"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["offboard", "--log-level", "debug", "cleanup"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Cleanup(_)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from([
            "offboard",
            "status",
            "--matter-id",
            "m-1",
            "--export-id",
            "e-1",
        ]);
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_status_requires_ids() {
        assert!(Cli::try_parse_from(["offboard", "status"]).is_err());
    }

    #[test]
    fn test_cli_parse_validate_and_init() {
        let cli = Cli::parse_from(["offboard", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
        let cli = Cli::parse_from(["offboard", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test_case(OffboardError::Configuration("x".into()), 2 ; "configuration")]
    #[test_case(OffboardError::Validation("x".into()), 2 ; "validation")]
    #[test_case(OffboardError::Authorization("x".into()), 4 ; "authorization")]
    #[test_case(OffboardError::Connection("x".into()), 4 ; "connection")]
    #[test_case(OffboardError::Cancelled("x".into()), 130 ; "cancelled")]
    #[test_case(OffboardError::Transfer(TransferError::NoFinalResponse { object: "a".into() }), 5 ; "transfer")]
    fn test_exit_code(err: OffboardError, expected: i32) {
        assert_eq!(exit_code(&err), expected);
    }
}
