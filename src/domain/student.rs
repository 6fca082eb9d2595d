//! Student enrollment domain model

use super::analytics::{AnalyticsOutcome, StudentAnalytics};
use super::ids::{CourseId, EnrollmentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Embedded user profile of an enrolled student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub sortable_name: Option<String>,
    pub short_name: Option<String>,
    pub login_id: Option<String>,
    pub email: Option<String>,
}

impl UserProfile {
    /// True when an email is present and not blank
    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

/// Current/final score pair
///
/// `current == final` is treated elsewhere as a proxy for "no missing work".
/// It is an approximation, not a guarantee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub current_score: Option<f64>,
    pub final_score: Option<f64>,
    pub current_grade: Option<String>,
    pub final_grade: Option<String>,
}

/// Enrollment detail fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentDetails {
    pub enrollment_state: String,
    pub role: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Seconds of recorded activity
    pub total_activity_time: Option<u64>,
}

/// One student's enrollment in one course
///
/// Collectors always populate `user`, `scores` and `enrollment`; the merge
/// stage blanks the sections the active profile does not ask for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub enrollment_id: EnrollmentId,
    pub student_id: UserId,
    pub course_id: CourseId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<ScoreSummary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<EnrollmentDetails>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<StudentAnalytics>,
}

impl StudentRecord {
    pub fn current_score(&self) -> Option<f64> {
        self.scores.as_ref().and_then(|s| s.current_score)
    }

    pub fn final_score(&self) -> Option<f64> {
        self.scores.as_ref().and_then(|s| s.final_score)
    }

    pub fn analytics_outcome(&self) -> AnalyticsOutcome {
        self.analytics
            .as_ref()
            .map_or(AnalyticsOutcome::NotRequested, |a| a.outcome)
    }
}

/// Flat per-student status row for the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentStatusRecord {
    pub course_id: CourseId,
    pub student_id: UserId,
    pub enrollment_id: EnrollmentId,
    pub enrollment_state: Option<String>,
    pub current_score: Option<f64>,
    pub final_score: Option<f64>,
    pub submitted_count: Option<usize>,
    pub missing_count: Option<usize>,
    pub analytics: AnalyticsOutcome,
}

impl From<&StudentRecord> for EnrollmentStatusRecord {
    fn from(student: &StudentRecord) -> Self {
        let counts = student
            .analytics
            .as_ref()
            .filter(|a| a.outcome != AnalyticsOutcome::NotRequested);

        Self {
            course_id: student.course_id,
            student_id: student.student_id,
            enrollment_id: student.enrollment_id,
            enrollment_state: student
                .enrollment
                .as_ref()
                .map(|e| e.enrollment_state.clone()),
            current_score: student.current_score(),
            final_score: student.final_score(),
            submitted_count: counts.map(|a| a.submitted.len()),
            missing_count: counts.map(|a| a.missing.len()),
            analytics: student.analytics_outcome(),
        }
    }
}
