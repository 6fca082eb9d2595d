//! Course-scoped output graph
//!
//! This is the plain, JSON-serializable structure handed to the persistence
//! collaborator. It carries no behaviour beyond a few read-only helpers.

use super::analytics::AnalyticsReport;
use super::assignment::{AssignmentRecord, ModuleRecord};
use super::course::Course;
use super::errors::SyncStage;
use super::ids::CourseId;
use super::student::{EnrollmentStatusRecord, StudentRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wall-clock time spent in one orchestrator stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: SyncStage,
    pub elapsed_ms: u64,
    /// True when the profile switched the stage off
    pub skipped: bool,
}

/// Aggregate call/time metrics of one course sync
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncMetrics {
    pub api_calls: u64,
    pub elapsed_ms: u64,
    pub avg_ms_per_call: f64,
    pub analytics: AnalyticsReport,
    pub stages: Vec<StageTiming>,
}

impl SyncMetrics {
    /// Average wall-clock time per API call
    pub fn compute_average(api_calls: u64, elapsed_ms: u64) -> f64 {
        if api_calls == 0 {
            return 0.0;
        }
        elapsed_ms as f64 / api_calls as f64
    }
}

/// Everything collected for one course in one sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseGraph {
    pub run_id: Uuid,
    pub synced_at: DateTime<Utc>,
    pub course_id: CourseId,
    pub course: Option<Course>,
    pub students: Vec<StudentRecord>,
    pub modules: Vec<ModuleRecord>,
    pub assignments: Vec<AssignmentRecord>,
    pub enrollment_statuses: Vec<EnrollmentStatusRecord>,
    pub metrics: SyncMetrics,
}

impl CourseGraph {
    /// A course is ready when it has course info and at least one enrollment
    pub fn is_ready(&self) -> bool {
        self.course.is_some() && !self.students.is_empty()
    }

    pub fn log_summary(&self) {
        tracing::info!(
            course_id = %self.course_id,
            students = self.students.len(),
            modules = self.modules.len(),
            assignments = self.assignments.len(),
            api_calls = self.metrics.api_calls,
            elapsed_ms = self.metrics.elapsed_ms,
            avg_ms_per_call = format!("{:.1}", self.metrics.avg_ms_per_call),
            analytics_calls = self.metrics.analytics.calls_made,
            analytics_skipped = self.metrics.analytics.calls_skipped,
            "Course sync completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_per_call() {
        assert_eq!(SyncMetrics::compute_average(0, 100), 0.0);
        assert_eq!(SyncMetrics::compute_average(4, 100), 25.0);
    }

    #[test]
    fn test_graph_without_course_is_not_ready() {
        let graph = CourseGraph {
            run_id: Uuid::new_v4(),
            synced_at: Utc::now(),
            course_id: CourseId::new(1),
            course: None,
            students: Vec::new(),
            modules: Vec::new(),
            assignments: Vec::new(),
            enrollment_statuses: Vec::new(),
            metrics: SyncMetrics::default(),
        };
        assert!(!graph.is_ready());
    }
}
