//! Configuration management for Canvas Sync.
//!
//! # Overview
//!
//! Canvas Sync uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CANVAS_SYNC_<SECTION>_<KEY>` environment overrides
//! - Default values for every optional setting
//! - Validation of every section on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use canvas_sync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("canvas-sync.toml")?;
//!
//! println!("Canvas: {}", config.canvas.base_url);
//! println!("Budget: {}/h", config.canvas.rate_limit.requests_per_hour);
//! println!("Profile: {}", config.sync.profile);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`CanvasConfig`] - base URL, token, page size, [`RateLimitConfig`], [`RetryConfig`]
//! - [`SyncConfig`] - profile preset and override, course ids, analytics settings
//! - [`BulkConfig`] - discovery filter and batching
//! - [`LoggingConfig`] - optional rolling JSON log files
//!
//! # Example Configuration
//!
//! ```toml
//! [canvas]
//! base_url = "https://canvas.example.edu"
//! api_token = "${CANVAS_API_TOKEN}"
//!
//! [canvas.rate_limit]
//! requests_per_hour = 3000
//! on_exhausted = "wait"
//!
//! [sync]
//! profile = "full"
//! course_ids = [12345]
//!
//! [bulk]
//! batch_size = 3
//! workflow_states = ["available"]
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_str};
pub use schema::{
    ApplicationConfig, BulkConfig, CanvasConfig, CanvasSyncConfig, ExhaustionMode, LoggingConfig,
    RateLimitConfig, RetryConfig, SyncConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
