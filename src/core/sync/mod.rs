//! Orchestration
//!
//! - [`course`] - single-course orchestrator ([`CourseSynchronizer`])
//! - [`bulk`] - discovery plus batched fan-out ([`BulkSynchronizer`])
//! - [`summary`] - bulk results and reporting

pub mod bulk;
pub mod course;
pub mod summary;

pub use bulk::BulkSynchronizer;
pub use course::CourseSynchronizer;
pub use summary::{BulkSyncResult, CourseFailure, CourseMetrics};
