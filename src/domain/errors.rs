//! Domain error types
//!
//! This module defines the error hierarchy for Canvas Sync. Transport details
//! from reqwest never leak through these types; everything is reduced to
//! status codes and messages.

use super::ids::CourseId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main Canvas Sync error type
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Canvas API errors
    #[error("Canvas API error: {0}")]
    Canvas(#[from] CanvasError),

    /// Assembled data failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// An orchestrator stage failed for a course
    #[error("Sync of course {course_id} failed at stage '{stage}': {source}")]
    StageFailed {
        course_id: CourseId,
        stage: SyncStage,
        #[source]
        source: Box<SyncError>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// Wraps this error with the stage that produced it
    pub fn at_stage(self, course_id: CourseId, stage: SyncStage) -> Self {
        match self {
            already @ SyncError::StageFailed { .. } => already,
            other => SyncError::StageFailed {
                course_id,
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The underlying Canvas error, looking through stage wrappers
    pub fn canvas_error(&self) -> Option<&CanvasError> {
        match self {
            SyncError::Canvas(e) => Some(e),
            SyncError::StageFailed { source, .. } => source.canvas_error(),
            _ => None,
        }
    }

    /// The stage this error was raised in, if any
    pub fn stage(&self) -> Option<SyncStage> {
        match self {
            SyncError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// True for local budget exhaustion and server-side throttling
    pub fn is_rate_limit(&self) -> bool {
        self.canvas_error().is_some_and(CanvasError::is_rate_limit)
    }

    /// True when Canvas answered 404
    pub fn is_not_found(&self) -> bool {
        self.canvas_error().is_some_and(CanvasError::is_not_found)
    }
}

/// Canvas API errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CanvasError {
    /// Failed to connect to the Canvas server
    #[error("Failed to connect to Canvas: {0}")]
    ConnectionFailed(String),

    /// Request timed out at the transport level
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Token rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Entity does not exist or is not accessible
    #[error("Not found: {0}")]
    NotFound(String),

    /// The local rolling request budget refused the call
    #[error("Request budget exhausted: {used}/{limit} requests in the current window")]
    BudgetExhausted { used: usize, limit: usize },

    /// Canvas throttled the request
    #[error("Rate limited by Canvas ({status}): {message}")]
    RateLimited { status: u16, message: String },

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Body could not be decoded
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl CanvasError {
    /// Errors worth retrying after a pause
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CanvasError::ConnectionFailed(_)
                | CanvasError::Timeout(_)
                | CanvasError::ServerError { .. }
        )
    }

    /// Rate-limit conditions are surfaced, never retried
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self,
            CanvasError::BudgetExhausted { .. } | CanvasError::RateLimited { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CanvasError::NotFound(_))
    }
}

/// Orchestrator stage of a single-course sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    /// Course record
    CourseInfo,
    /// Enrollments and the analytics pass
    Enrollments,
    /// Module and assignment listings plus reconciliation
    ModulesAssignments,
    /// Graph assembly and validation
    Merge,
}

impl SyncStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStage::CourseInfo => "course_info",
            SyncStage::Enrollments => "enrollments",
            SyncStage::ModulesAssignments => "modules_assignments",
            SyncStage::Merge => "merge",
        }
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}
