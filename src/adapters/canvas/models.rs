//! Canvas wire models
//!
//! These mirror the JSON Canvas returns, with every optional field decoded
//! leniently: a malformed timestamp or a number sent as a string degrades to
//! `None` (or a documented default) instead of failing the whole record.
//! Conversions into domain records live next to each model.

use crate::domain::{
    AnalyticsRecord, AssignmentId, AssignmentKind, AssignmentRecord, ContentKey, CourseId,
    EnrollmentDetails, EnrollmentId, ModuleId, ModuleItemId, QuizId, RecordSource, ScoreSummary,
    SubmissionStatus, UserId, UserProfile,
};
use crate::domain::Course;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Lenient field decoders for `#[serde(default, deserialize_with = ...)]`
pub(crate) mod lenient {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
        Option::<Value>::deserialize(deserializer)
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match value(deserializer)? {
            Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        })
    }

    pub fn float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match value(deserializer)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        })
    }

    pub fn uint<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match value(deserializer)? {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            _ => None,
        })
    }

    pub fn uint32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(uint(deserializer)?.and_then(|n| u32::try_from(n).ok()))
    }

    pub fn boolean<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match value(deserializer)? {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::String(s)) => s.trim().parse::<bool>().ok(),
            _ => None,
        })
    }

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match value(deserializer)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match value(deserializer)? {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiCalendar {
    #[serde(default, deserialize_with = "lenient::string")]
    pub ics: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiTerm {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
}

/// `GET /courses/:id` and entries of `GET /courses`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCourse {
    pub id: CourseId,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub course_code: Option<String>,
    #[serde(default)]
    pub calendar: Option<ApiCalendar>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub workflow_state: Option<String>,
    #[serde(default)]
    pub term: Option<ApiTerm>,
    #[serde(default, deserialize_with = "lenient::uint32")]
    pub total_students: Option<u32>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApiCourse {
    pub fn into_course(self) -> Course {
        Course {
            id: self.id,
            name: self.name.unwrap_or_default(),
            course_code: self.course_code.unwrap_or_default(),
            calendar_ics: self.calendar.and_then(|c| c.ics),
            workflow_state: self
                .workflow_state
                .unwrap_or_else(|| "unknown".to_string()),
            term_name: self.term.and_then(|t| t.name),
            total_students: self.total_students,
            start_at: self.start_at,
            end_at: self.end_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Embedded `user` object of an enrollment
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: UserId,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub sortable_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub short_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub login_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: Option<String>,
}

impl ApiUser {
    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.unwrap_or_default(),
            sortable_name: self.sortable_name,
            short_name: self.short_name,
            login_id: self.login_id,
            email: self.email,
        }
    }
}

/// `grades` object of an enrollment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiGrades {
    #[serde(default, deserialize_with = "lenient::float")]
    pub current_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub final_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub current_grade: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub final_grade: Option<String>,
}

/// `GET /courses/:id/enrollments`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub enrollment_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub enrollment_state: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub last_activity_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::uint")]
    pub total_activity_time: Option<u64>,
    #[serde(default)]
    pub grades: Option<ApiGrades>,
    #[serde(default)]
    pub user: Option<ApiUser>,
}

impl ApiEnrollment {
    pub fn scores(&self) -> ScoreSummary {
        let grades = self.grades.clone().unwrap_or_default();
        ScoreSummary {
            current_score: grades.current_score,
            final_score: grades.final_score,
            current_grade: grades.current_grade,
            final_grade: grades.final_grade,
        }
    }

    pub fn details(&self) -> EnrollmentDetails {
        EnrollmentDetails {
            enrollment_state: self
                .enrollment_state
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            role: self.role.clone().or_else(|| self.enrollment_type.clone()),
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_activity_at: self.last_activity_at,
            total_activity_time: self.total_activity_time,
        }
    }
}

/// `GET /courses/:id/assignments`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiAssignment {
    pub id: AssignmentId,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub points_possible: Option<f64>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub unlock_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub lock_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "lenient::uint32")]
    pub position: Option<u32>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub submission_types: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub grading_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub has_submitted_submissions: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub html_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub is_quiz_assignment: Option<bool>,
    #[serde(default)]
    pub quiz_id: Option<QuizId>,
}

impl ApiAssignment {
    pub fn kind(&self) -> AssignmentKind {
        let quiz_submission = self
            .submission_types
            .as_ref()
            .is_some_and(|types| types.iter().any(|t| t == "online_quiz"));
        if self.is_quiz_assignment.unwrap_or(false) || quiz_submission || self.quiz_id.is_some() {
            AssignmentKind::Quiz
        } else {
            AssignmentKind::Assignment
        }
    }

    /// Listing-sourced record; missing points become 0, missing publication `true`
    pub fn into_record(self, course_id: CourseId) -> AssignmentRecord {
        let mut record = AssignmentRecord::new(ContentKey::Assignment(self.id), course_id, self.kind());
        record.source = RecordSource::Listing;
        record.position = self.position.unwrap_or(0);
        record.published = self.published.unwrap_or(true);
        record.quiz_id = self.quiz_id;
        record.name = Some(self.name.unwrap_or_default());
        record.points_possible = Some(self.points_possible.unwrap_or(0.0));
        record.due_at = self.due_at;
        record.unlock_at = self.unlock_at;
        record.lock_at = self.lock_at;
        record.created_at = self.created_at;
        record.updated_at = self.updated_at;
        record.submission_types = self.submission_types;
        record.grading_type = self.grading_type;
        record.has_submitted_submissions = self.has_submitted_submissions;
        record.html_url = self.html_url;
        record
    }
}

/// `content_details` of a module item (`include[]=content_details`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiContentDetails {
    #[serde(default, deserialize_with = "lenient::float")]
    pub points_possible: Option<f64>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub unlock_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub lock_at: Option<DateTime<Utc>>,
}

/// Entry of a module's `items`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiModuleItem {
    pub id: ModuleItemId,
    #[serde(default)]
    pub module_id: Option<ModuleId>,
    #[serde(default, deserialize_with = "lenient::uint32")]
    pub position: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub item_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::uint")]
    pub content_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub html_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub published: Option<bool>,
    #[serde(default)]
    pub content_details: Option<ApiContentDetails>,
}

impl ApiModuleItem {
    /// `Assignment` and `Quiz` items; pages, files and headers are ignored
    pub fn kind(&self) -> Option<AssignmentKind> {
        match self.item_type.as_deref() {
            Some("Assignment") => Some(AssignmentKind::Assignment),
            Some("Quiz") => Some(AssignmentKind::Quiz),
            _ => None,
        }
    }

    /// Id of the referenced content, taken from the API URL when possible
    ///
    /// For `Quiz` items this is a quiz id, not an assignment id.
    pub fn content_ref(&self) -> Option<u64> {
        let segment = match self.kind()? {
            AssignmentKind::Assignment => "assignments",
            AssignmentKind::Quiz => "quizzes",
        };
        self.url
            .as_deref()
            .and_then(|url| id_after_segment(url, segment))
            .or(self.content_id)
    }
}

/// Numeric path segment following `segment`, e.g. `.../assignments/42` → 42
pub fn id_after_segment(url: &str, segment: &str) -> Option<u64> {
    let path = url.split(['?', '#']).next()?;
    let mut parts = path.split('/');
    while let Some(part) = parts.next() {
        if part == segment {
            return parts.next().and_then(|id| id.parse::<u64>().ok());
        }
    }
    None
}

/// `GET /courses/:id/modules`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiModule {
    pub id: ModuleId,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::uint32")]
    pub position: Option<u32>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub unlock_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::uint32")]
    pub items_count: Option<u32>,
    /// Absent when Canvas declines to inline items for large modules
    #[serde(default)]
    pub items: Option<Vec<ApiModuleItem>>,
}

impl ApiModule {
    /// Items were not inlined but the module is not empty
    pub fn needs_item_fetch(&self) -> bool {
        self.items.is_none() && self.items_count.unwrap_or(0) > 0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiAnalyticsSubmission {
    #[serde(default, deserialize_with = "lenient::float")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub posted_at: Option<DateTime<Utc>>,
}

/// `GET /courses/:course_id/analytics/users/:student_id/assignments`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiAnalyticsAssignment {
    pub assignment_id: AssignmentId,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub points_possible: Option<f64>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub excused: Option<bool>,
    #[serde(default)]
    pub submission: Option<ApiAnalyticsSubmission>,
}

impl ApiAnalyticsAssignment {
    /// Unknown or missing status tags become `Floating`
    pub fn into_record(self) -> AnalyticsRecord {
        let submission = self.submission.unwrap_or_default();
        AnalyticsRecord {
            assignment_id: self.assignment_id,
            title: self.title.unwrap_or_default(),
            status: self
                .status
                .as_deref()
                .and_then(|s| s.parse::<SubmissionStatus>().ok())
                .unwrap_or(SubmissionStatus::Floating),
            score: submission.score,
            submitted_at: submission.submitted_at,
            posted_at: submission.posted_at,
            due_at: self.due_at,
            points_possible: self.points_possible.unwrap_or(0.0),
            excused: self.excused.unwrap_or(false),
        }
    }
}
