//! Domain models and types for Canvas Sync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`CourseId`], [`UserId`], [`AssignmentId`], ...)
//! - **Outbound records** ([`Course`], [`StudentRecord`], [`AssignmentRecord`],
//!   [`ModuleRecord`], [`EnrollmentStatusRecord`]) assembled into a [`CourseGraph`]
//! - **Error types** ([`SyncError`], [`CanvasError`])
//! - **Result type alias** ([`Result`])
//!
//! Records are plain data: they serialize to the JSON shape the persistence
//! layer bulk-inserts and carry no behaviour tied to the network.
//!
//! # Type Safety
//!
//! ```rust
//! use canvas_sync::domain::{CourseId, UserId};
//!
//! let course = CourseId::new(101);
//! let user = UserId::new(101);
//!
//! // This won't compile - the id types do not mix
//! // let wrong: CourseId = user;
//! assert_eq!(course.get(), user.get());
//! ```

pub mod analytics;
pub mod assignment;
pub mod course;
pub mod errors;
pub mod graph;
pub mod ids;
pub mod result;
pub mod student;

pub use analytics::{
    AnalyticsOutcome, AnalyticsRecord, AnalyticsReport, StudentAnalytics, SubmissionStatus,
};
pub use assignment::{
    AssignmentKind, AssignmentRecord, ContentKey, ModuleLink, ModuleRecord, RecordSource,
};
pub use course::Course;
pub use errors::{CanvasError, SyncError, SyncStage};
pub use graph::{CourseGraph, StageTiming, SyncMetrics};
pub use ids::{AssignmentId, CourseId, EnrollmentId, ModuleId, ModuleItemId, QuizId, UserId};
pub use result::Result;
pub use student::{EnrollmentDetails, EnrollmentStatusRecord, ScoreSummary, StudentRecord, UserProfile};
