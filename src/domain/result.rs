//! Result type alias for Canvas Sync

use super::errors::SyncError;

/// Result type alias for Canvas Sync operations
///
/// # Examples
///
/// ```
/// use canvas_sync::domain::result::Result;
/// use canvas_sync::domain::errors::SyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SyncError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SyncError>;
