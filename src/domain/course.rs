//! Course domain model

use super::ids::CourseId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Canvas course as handed to the persistence layer
///
/// Built fresh on every sync from the course-info call (or the discovery
/// listing in bulk runs) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub course_code: String,

    /// iCalendar feed URL for the course calendar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_ics: Option<String>,

    /// `unpublished`, `available`, `completed` or `deleted`
    pub workflow_state: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_students: Option<u32>,

    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Course {
    /// True when the workflow state is one of `states` (case-insensitive)
    pub fn has_workflow_state(&self, states: &[String]) -> bool {
        states
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&self.workflow_state))
    }
}
