//! Configuration schema types
//!
//! This module defines the configuration structure for Canvas Sync. Every
//! section carries serde defaults so a minimal file only needs the Canvas
//! base URL and token.

use crate::config::SecretString;
use crate::core::profile::{CollectionProfile, ProfileOverride, ProfilePreset};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main Canvas Sync configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasSyncConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Canvas API connection, rate budget and retries
    pub canvas: CanvasConfig,

    /// Single-course sync settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Discovery and batch settings
    #[serde(default)]
    pub bulk: BulkConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CanvasSyncConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.canvas.validate()?;
        self.sync.validate()?;
        self.bulk.validate()?;
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
        }
    }
}

/// What the gateway does when the rolling budget is spent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExhaustionMode {
    /// Sleep until the oldest request leaves the window
    #[default]
    Wait,
    /// Refuse the call with a rate-limit error
    Fail,
}

/// Rolling request budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Ceiling of requests per rolling window
    #[serde(default = "default_requests_per_hour")]
    pub requests_per_hour: usize,

    /// Length of the rolling window in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Minimum spacing between two requests
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    #[serde(default)]
    pub on_exhausted: ExhaustionMode,

    /// Longest single wait accepted under `on_exhausted = "wait"`
    #[serde(default = "default_max_wait_seconds")]
    pub max_wait_seconds: u64,
}

impl RateLimitConfig {
    fn validate(&self) -> Result<(), String> {
        if self.requests_per_hour == 0 {
            return Err("canvas.rate_limit.requests_per_hour must be > 0".to_string());
        }
        if self.window_seconds == 0 {
            return Err("canvas.rate_limit.window_seconds must be > 0".to_string());
        }
        if self.min_interval_ms > 60_000 {
            return Err(format!(
                "canvas.rate_limit.min_interval_ms must be at most 60000, got {}",
                self.min_interval_ms
            ));
        }
        Ok(())
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_seconds)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_hour: default_requests_per_hour(),
            window_seconds: default_window_seconds(),
            min_interval_ms: default_min_interval_ms(),
            on_exhausted: ExhaustionMode::default(),
            max_wait_seconds: default_max_wait_seconds(),
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt
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

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "canvas.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(
                "canvas.retry.initial_delay_ms cannot exceed canvas.retry.max_delay_ms"
                    .to_string(),
            );
        }
        Ok(())
    }

    /// Backoff before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        let capped = delay.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }
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

/// Canvas API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Instance root, e.g. `https://canvas.example.edu`
    pub base_url: String,

    /// Access token sent as a bearer credential
    /// Stored securely in memory and automatically zeroized on drop
    pub api_token: SecretString,

    /// Per-request transport timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Page size requested from paginated endpoints
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Hard stop for a single paginated listing
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl CanvasConfig {
    /// Connection settings with defaults for everything else
    pub fn new(base_url: impl Into<String>, api_token: SecretString) -> Self {
        Self {
            base_url: base_url.into(),
            api_token,
            timeout_seconds: default_timeout_seconds(),
            per_page: default_per_page(),
            max_pages: default_max_pages(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.base_url.is_empty() {
            return Err("canvas.base_url cannot be empty".to_string());
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("canvas.base_url '{}' is not a valid URL: {e}", self.base_url))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err("canvas.base_url must start with http:// or https://".to_string());
        }

        if self.api_token.expose_secret().is_empty() {
            return Err("canvas.api_token cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("canvas.timeout_seconds must be > 0".to_string());
        }

        if !(1..=100).contains(&self.per_page) {
            return Err(format!(
                "canvas.per_page must be between 1 and 100, got {}",
                self.per_page
            ));
        }

        if self.max_pages == 0 {
            return Err("canvas.max_pages must be > 0".to_string());
        }

        self.rate_limit.validate()?;
        self.retry.validate()?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Single-course sync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Preset name the profile starts from
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Courses synced when no ids are given on the command line
    #[serde(default)]
    pub course_ids: Vec<u64>,

    /// Skip analytics calls for students whose current and final scores match
    #[serde(default = "default_true")]
    pub analytics_optimization: bool,

    /// Analytics calls in flight at once
    #[serde(default = "default_max_concurrent_analytics")]
    pub max_concurrent_analytics: usize,

    /// Partial override merged onto the preset
    #[serde(default)]
    pub profile_override: ProfileOverride,
}

impl SyncConfig {
    fn validate(&self) -> Result<(), String> {
        self.profile
            .parse::<ProfilePreset>()
            .map_err(|e| format!("sync.profile: {e}"))?;

        if self.max_concurrent_analytics == 0 || self.max_concurrent_analytics > 32 {
            return Err(format!(
                "sync.max_concurrent_analytics must be between 1 and 32, got {}",
                self.max_concurrent_analytics
            ));
        }

        if self.course_ids.contains(&0) {
            return Err("sync.course_ids cannot contain 0".to_string());
        }

        Ok(())
    }

    /// Preset plus override
    pub fn resolve_profile(&self) -> Result<CollectionProfile, String> {
        let preset = self
            .profile
            .parse::<ProfilePreset>()
            .map_err(|e| format!("sync.profile: {e}"))?;
        Ok(CollectionProfile::merged(
            &preset.profile(),
            &self.profile_override,
        ))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            course_ids: Vec::new(),
            analytics_optimization: true,
            max_concurrent_analytics: default_max_concurrent_analytics(),
            profile_override: ProfileOverride::default(),
        }
    }
}

/// Discovery and batching for multi-course runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConfig {
    /// Courses synced concurrently per batch
    #[serde(default = "default_bulk_batch_size")]
    pub batch_size: usize,

    /// Pause between batches in milliseconds
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,

    /// Workflow states kept by discovery (case-insensitive)
    #[serde(default = "default_workflow_states")]
    pub workflow_states: Vec<String>,

    /// Cap on discovered courses
    #[serde(default)]
    pub max_courses: Option<usize>,
}

impl BulkConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 || self.batch_size > 20 {
            return Err(format!(
                "bulk.batch_size must be between 1 and 20, got {}",
                self.batch_size
            ));
        }
        if self.workflow_states.is_empty() {
            return Err("bulk.workflow_states cannot be empty".to_string());
        }
        if self.max_courses == Some(0) {
            return Err("bulk.max_courses must be > 0 when set".to_string());
        }
        Ok(())
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            batch_size: default_bulk_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
            workflow_states: default_workflow_states(),
            max_courses: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_per_page() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    500
}

fn default_requests_per_hour() -> usize {
    3000
}

fn default_window_seconds() -> u64 {
    3600
}

fn default_min_interval_ms() -> u64 {
    100
}

fn default_max_wait_seconds() -> u64 {
    300
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_profile() -> String {
    "full".to_string()
}

fn default_max_concurrent_analytics() -> usize {
    4
}

fn default_bulk_batch_size() -> usize {
    3
}

fn default_batch_pause_ms() -> u64 {
    1000
}

fn default_workflow_states() -> Vec<String> {
    vec!["available".to_string()]
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn canvas_config() -> CanvasConfig {
        CanvasConfig::new(
            "https://canvas.example.edu",
            secret_string("token".to_string()),
        )
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_canvas_config_validation() {
        let mut config = canvas_config();
        assert!(config.validate().is_ok());

        config.base_url = "ftp://canvas.example.edu".to_string();
        assert!(config.validate().is_err());

        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config = canvas_config();
        config.api_token = secret_string(String::new());
        assert!(config.validate().is_err());

        config = canvas_config();
        config.per_page = 0;
        assert!(config.validate().is_err());
        config.per_page = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rate_limit_validation() {
        let mut config = canvas_config();
        config.rate_limit.requests_per_hour = 0;
        let err = config.validate().unwrap_err();
        assert!(err.contains("requests_per_hour"));
    }

    #[test]
    fn test_retry_delay_grows_and_caps() {
        let retry = RetryConfig {
            max_retries: 5,
            initial_delay_ms: 100,
            max_delay_ms: 350,
            backoff_multiplier: 2.0,
        };

        assert_eq!(retry.delay_for(1), Duration::from_millis(100));
        assert_eq!(retry.delay_for(2), Duration::from_millis(200));
        assert_eq!(retry.delay_for(3), Duration::from_millis(350));
        assert_eq!(retry.delay_for(10), Duration::from_millis(350));
    }

    #[test]
    fn test_retry_validation() {
        let mut retry = RetryConfig::default();
        assert!(retry.validate().is_ok());

        retry.backoff_multiplier = 0.5;
        assert!(retry.validate().is_err());
    }

    #[test]
    fn test_sync_config_validation() {
        let mut config = SyncConfig::default();
        assert!(config.validate().is_ok());

        config.profile = "everything".to_string();
        assert!(config.validate().is_err());

        config.profile = "lightweight".to_string();
        config.max_concurrent_analytics = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_profile_applies_override() {
        let mut config = SyncConfig {
            profile: "students_only".to_string(),
            ..SyncConfig::default()
        };
        config.profile_override.categories.modules = Some(true);

        let profile = config.resolve_profile().unwrap();
        assert!(profile.categories.modules);
        assert!(!profile.categories.assignments);
    }

    #[test]
    fn test_bulk_config_validation() {
        let mut config = BulkConfig::default();
        assert!(config.validate().is_ok());

        config.batch_size = 0;
        assert!(config.validate().is_err());

        config.batch_size = 3;
        config.workflow_states.clear();
        assert!(config.validate().is_err());

        config.workflow_states = vec!["available".to_string()];
        config.max_courses = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minimal_toml_takes_defaults() {
        let config: CanvasSyncConfig = toml::from_str(
            r#"
[canvas]
base_url = "https://canvas.example.edu"
api_token = "abc"
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.canvas.per_page, 100);
        assert_eq!(config.canvas.rate_limit.requests_per_hour, 3000);
        assert_eq!(config.canvas.rate_limit.on_exhausted, ExhaustionMode::Wait);
        assert_eq!(config.sync.profile, "full");
        assert_eq!(config.bulk.batch_size, 3);
        assert_eq!(config.bulk.workflow_states, vec!["available".to_string()]);
        assert!(!config.logging.local_enabled);
    }
}
