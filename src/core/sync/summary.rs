//! Bulk sync summary and reporting

use crate::domain::{
    AnalyticsReport, AssignmentRecord, Course, CourseGraph, CourseId, EnrollmentStatusRecord,
    ModuleRecord, StudentRecord, SyncError, SyncMetrics, SyncStage,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Per-course metrics kept after the graph is folded into the result
#[derive(Debug, Clone, Serialize)]
pub struct CourseMetrics {
    pub course_id: CourseId,
    pub ready: bool,
    pub metrics: SyncMetrics,
}

/// A course that could not be synced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseFailure {
    pub course_id: CourseId,
    /// Stage that failed, when the orchestrator got that far
    pub stage: Option<SyncStage>,
    /// Canvas answered 404 (deleted or inaccessible course)
    pub not_found: bool,
    pub message: String,
}

impl CourseFailure {
    pub fn new(course_id: CourseId, error: &SyncError) -> Self {
        Self {
            course_id,
            stage: error.stage(),
            not_found: error.is_not_found(),
            message: error.to_string(),
        }
    }
}

/// Combined output of a bulk run
#[derive(Debug, Clone, Serialize)]
pub struct BulkSyncResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,

    /// Courses the run tried to sync
    pub courses_attempted: usize,

    pub courses: Vec<Course>,
    pub students: Vec<StudentRecord>,
    pub modules: Vec<ModuleRecord>,
    pub assignments: Vec<AssignmentRecord>,
    pub enrollment_statuses: Vec<EnrollmentStatusRecord>,

    /// Courses with course info and at least one enrollment
    pub ready_courses: Vec<CourseId>,
    pub failures: Vec<CourseFailure>,
    pub course_metrics: Vec<CourseMetrics>,

    pub total_api_calls: u64,
    pub analytics: AnalyticsReport,
    pub duration_ms: u64,
}

impl BulkSyncResult {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            courses_attempted: 0,
            courses: Vec::new(),
            students: Vec::new(),
            modules: Vec::new(),
            assignments: Vec::new(),
            enrollment_statuses: Vec::new(),
            ready_courses: Vec::new(),
            failures: Vec::new(),
            course_metrics: Vec::new(),
            total_api_calls: 0,
            analytics: AnalyticsReport::default(),
            duration_ms: 0,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    /// Folds one course graph into the combined collections
    pub fn add_graph(&mut self, graph: CourseGraph) {
        let ready = graph.is_ready();
        self.courses_attempted += 1;
        if ready {
            self.ready_courses.push(graph.course_id);
        }
        self.total_api_calls += graph.metrics.api_calls;
        self.analytics.merge(&graph.metrics.analytics);
        self.course_metrics.push(CourseMetrics {
            course_id: graph.course_id,
            ready,
            metrics: graph.metrics,
        });

        self.courses.extend(graph.course);
        self.students.extend(graph.students);
        self.modules.extend(graph.modules);
        self.assignments.extend(graph.assignments);
        self.enrollment_statuses.extend(graph.enrollment_statuses);
    }

    pub fn add_failure(&mut self, failure: CourseFailure) {
        self.courses_attempted += 1;
        self.failures.push(failure);
    }

    pub fn succeeded(&self) -> usize {
        self.courses_attempted - self.failures.len()
    }

    /// Check if every attempted course synced
    pub fn is_successful(&self) -> bool {
        self.failures.is_empty()
    }

    /// Percentage of attempted courses that synced
    pub fn success_rate(&self) -> f64 {
        if self.courses_attempted == 0 {
            return 100.0;
        }
        (self.succeeded() as f64 / self.courses_attempted as f64) * 100.0
    }

    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            courses_attempted = self.courses_attempted,
            succeeded = self.succeeded(),
            failed = self.failures.len(),
            ready = self.ready_courses.len(),
            students = self.students.len(),
            assignments = self.assignments.len(),
            api_calls = self.total_api_calls,
            analytics_calls = self.analytics.calls_made,
            analytics_skipped = self.analytics.calls_skipped,
            duration_secs = self.duration_ms / 1000,
            success_rate = format!("{:.1}%", self.success_rate()),
            "Bulk sync completed"
        );

        if !self.failures.is_empty() {
            tracing::warn!(
                failure_count = self.failures.len(),
                "Bulk sync completed with failures"
            );
            for failure in &self.failures {
                tracing::warn!(
                    course_id = %failure.course_id,
                    stage = ?failure.stage,
                    not_found = failure.not_found,
                    message = %failure.message,
                    "Course sync failed"
                );
            }
        }
    }
}

impl Default for BulkSyncResult {
    fn default() -> Self {
        Self::new()
    }
}
