//! CLI command implementations
//!
//! Every command returns its process exit code:
//!
//! - `0` success
//! - `1` partial failure (some courses failed)
//! - `2` configuration error
//! - `3` rate limited
//! - `5` fatal error

pub mod discover;
pub mod profiles;
pub mod sync;
pub mod validate;

use crate::domain::SyncError;
use serde::Serialize;
use std::path::Path;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_RATE_LIMITED: i32 = 3;
pub const EXIT_FATAL: i32 = 5;

/// Exit code for a failed run
pub fn exit_code_for(error: &SyncError) -> i32 {
    if matches!(error, SyncError::Configuration(_)) {
        EXIT_CONFIG
    } else if error.is_rate_limit() {
        EXIT_RATE_LIMITED
    } else {
        EXIT_FATAL
    }
}

/// Writes `value` as pretty JSON
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "Wrote output");
    Ok(())
}
