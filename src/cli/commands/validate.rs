//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Canvas Sync configuration file.

use super::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::load_config;
use crate::config::schema::ExhaustionMode;
use crate::core::profile::{estimate_performance_impact, ImpactLevel};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates every section
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let profile = match config.sync.resolve_profile() {
            Ok(profile) => profile,
            Err(e) => {
                println!("❌ Profile could not be resolved");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        let impact = estimate_performance_impact(&profile);
        let rate = &config.canvas.rate_limit;

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Canvas: {}", config.canvas.base_url);
        println!("  API Token: ********");
        println!(
            "  Rate Budget: {} requests / {}s, {}ms spacing, {} when exhausted",
            rate.requests_per_hour,
            rate.window_seconds,
            rate.min_interval_ms,
            match rate.on_exhausted {
                ExhaustionMode::Wait => "wait",
                ExhaustionMode::Fail => "fail",
            }
        );
        println!("  Retries: {}", config.canvas.retry.max_retries);
        println!(
            "  Profile: {}{} (impact {:.2}, {})",
            config.sync.profile,
            if config.sync.profile_override.is_empty() {
                ""
            } else {
                " + override"
            },
            impact,
            ImpactLevel::from_score(impact)
        );
        println!(
            "  Analytics Optimization: {}",
            config.sync.analytics_optimization
        );
        println!("  Courses: {:?}", config.sync.course_ids);
        println!(
            "  Bulk: batches of {}, {}ms pause, states {:?}",
            config.bulk.batch_size, config.bulk.batch_pause_ms, config.bulk.workflow_states
        );
        println!();
        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let code = ValidateArgs {}
            .execute("/nonexistent/canvas-sync.toml")
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn test_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[canvas]\nbase_url = \"https://canvas.example.edu\"\napi_token = \"token\""
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }
}
