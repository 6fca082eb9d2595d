//! Logging and observability
//!
//! Structured logging with:
//! - Configurable log levels (overridable through `RUST_LOG`)
//! - Human-readable console output
//! - Optional JSON files with daily or hourly rotation
//!
//! # Example
//!
//! ```no_run
//! use canvas_sync::logging::init_logging;
//! use canvas_sync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(course_id = 42, "Sync requested");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a course sync
///
/// # Example
///
/// ```no_run
/// use canvas_sync::log_sync_start;
/// use canvas_sync::domain::CourseId;
///
/// log_sync_start!(CourseId::new(101), "full");
/// ```
#[macro_export]
macro_rules! log_sync_start {
    ($course_id:expr, $profile:expr) => {
        tracing::info!(
            course_id = %$course_id,
            profile = %$profile,
            "Starting course sync"
        );
    };
}

/// Log the completion of a course sync
///
/// # Example
///
/// ```no_run
/// use canvas_sync::log_sync_complete;
/// use std::time::Duration;
///
/// log_sync_complete!(101u64, 14u64, Duration::from_millis(2300));
/// ```
#[macro_export]
macro_rules! log_sync_complete {
    ($course_id:expr, $api_calls:expr, $duration:expr) => {
        tracing::info!(
            course_id = %$course_id,
            api_calls = $api_calls,
            duration_ms = $duration.as_millis() as u64,
            "Course sync finished"
        );
    };
}

/// Log a batch of a bulk run
///
/// # Example
///
/// ```no_run
/// use canvas_sync::log_batch_processing;
///
/// log_batch_processing!(2, 5);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($current:expr, $total:expr) => {
        tracing::info!(
            batch = $current,
            total_batches = $total,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Processing batch"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use canvas_sync::log_retry_attempt;
///
/// log_retry_attempt!("/api/v1/courses/1", 2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($endpoint:expr, $attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            endpoint = %$endpoint,
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying request"
        );
    };
}
