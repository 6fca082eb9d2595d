//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Canvas Sync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Canvas Sync - rate-limited Canvas LMS extraction
#[derive(Parser, Debug)]
#[command(name = "canvas-sync")]
#[command(version, about, long_about = None)]
#[command(author = "Canvas Sync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "canvas-sync.toml", env = "CANVAS_SYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CANVAS_SYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync one or more courses; discovers courses when none are given
    Sync(commands::sync::SyncArgs),

    /// List the courses a bulk sync would pick up
    Discover(commands::discover::DiscoverArgs),

    /// Show the built-in collection profiles
    Profiles(commands::profiles::ProfilesArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_sync() {
        let cli = Cli::parse_from(["canvas-sync", "sync"]);
        assert_eq!(cli.config, "canvas-sync.toml");
        assert!(matches!(cli.command, Commands::Sync(_)));
    }

    #[test]
    fn test_cli_parse_sync_with_courses() {
        let cli = Cli::parse_from([
            "canvas-sync",
            "sync",
            "--course-id",
            "101",
            "--course-id",
            "102",
            "--profile",
            "lightweight",
            "--no-optimization",
        ]);
        let Commands::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(args.course_ids, vec![101, 102]);
        assert_eq!(args.profile.as_deref(), Some("lightweight"));
        assert!(args.no_optimization);
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["canvas-sync", "--config", "custom.toml", "profiles"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Profiles(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["canvas-sync", "--log-level", "debug", "discover"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Discover(_)));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["canvas-sync", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }
}
