//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CanvasSyncConfig;
use crate::config::secret_string;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix of environment variables that override file values
pub const ENV_PREFIX: &str = "CANVAS_SYNC_";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`CanvasSyncConfig`]
/// 4. Applies environment variable overrides (`CANVAS_SYNC_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`SyncError::Configuration`] if the file is missing or unreadable,
/// a referenced variable is unset, the TOML is malformed or validation fails.
///
/// # Examples
///
/// ```no_run
/// use canvas_sync::config::load_config;
///
/// let config = load_config("canvas-sync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CanvasSyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_str(&contents)
}

/// Same pipeline as [`load_config`] over an in-memory document
pub fn load_config_str(contents: &str) -> Result<CanvasSyncConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: CanvasSyncConfig = toml::from_str(&contents)
        .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config
        .validate()
        .map_err(|e| SyncError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are passed through untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let substituted = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        lines.push(substituted.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_override(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}")).ok()
}

fn parse_override<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env_override(key) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            SyncError::Configuration(format!(
                "Environment override {ENV_PREFIX}{key} has an invalid value '{raw}'"
            ))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the `CANVAS_SYNC_*` prefix
///
/// Variables follow the pattern `CANVAS_SYNC_<SECTION>_<KEY>`, for example
/// `CANVAS_SYNC_CANVAS_BASE_URL` or `CANVAS_SYNC_BULK_BATCH_SIZE`.
fn apply_env_overrides(config: &mut CanvasSyncConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_override("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Canvas overrides
    if let Some(val) = env_override("CANVAS_BASE_URL") {
        config.canvas.base_url = val;
    }
    if let Some(val) = env_override("CANVAS_API_TOKEN") {
        config.canvas.api_token = secret_string(val);
    }
    if let Some(val) = parse_override("CANVAS_TIMEOUT_SECONDS")? {
        config.canvas.timeout_seconds = val;
    }
    if let Some(val) = parse_override("CANVAS_RATE_LIMIT_REQUESTS_PER_HOUR")? {
        config.canvas.rate_limit.requests_per_hour = val;
    }
    if let Some(val) = parse_override("CANVAS_RATE_LIMIT_MIN_INTERVAL_MS")? {
        config.canvas.rate_limit.min_interval_ms = val;
    }
    if let Some(val) = parse_override("CANVAS_RETRY_MAX_RETRIES")? {
        config.canvas.retry.max_retries = val;
    }

    // Sync overrides
    if let Some(val) = env_override("SYNC_PROFILE") {
        config.sync.profile = val;
    }
    if let Some(val) = parse_override("SYNC_ANALYTICS_OPTIMIZATION")? {
        config.sync.analytics_optimization = val;
    }
    if let Some(val) = parse_override("SYNC_MAX_CONCURRENT_ANALYTICS")? {
        config.sync.max_concurrent_analytics = val;
    }

    // Bulk overrides
    if let Some(val) = parse_override("BULK_BATCH_SIZE")? {
        config.bulk.batch_size = val;
    }
    if let Some(val) = parse_override("BULK_BATCH_PAUSE_MS")? {
        config.bulk.batch_pause_ms = val;
    }
    if let Some(val) = parse_override::<usize>("BULK_MAX_COURSES")? {
        config.bulk.max_courses = Some(val);
    }

    // Logging overrides
    if let Some(val) = parse_override("LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env_override("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
