//! Assignment and module domain models

use super::ids::{AssignmentId, CourseId, ModuleId, ModuleItemId, QuizId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of gradable item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentKind {
    Assignment,
    Quiz,
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentKind::Assignment => f.write_str("assignment"),
            AssignmentKind::Quiz => f.write_str("quiz"),
        }
    }
}

/// Identity of a gradable item
///
/// Quiz ids and assignment ids are separate Canvas sequences. A quiz backed by
/// a graded assignment is keyed by that assignment; a quiz with no assignment
/// behind it (practice quizzes, surveys) keeps its quiz id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ContentKey {
    Assignment(AssignmentId),
    Quiz(QuizId),
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKey::Assignment(id) => write!(f, "assignment {id}"),
            ContentKey::Quiz(id) => write!(f, "quiz {id}"),
        }
    }
}

/// Which listing(s) an assignment record was discovered through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Assignment listing only
    Listing,
    /// Module items only
    Module,
    /// Both; module data supplies position/publication, the listing supplies content
    Merged,
}

/// Placement of an assignment inside a module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleLink {
    pub module_id: ModuleId,
    pub module_name: String,
    pub module_position: u32,
    pub module_item_id: ModuleItemId,
}

/// An assignment or quiz, de-duplicated across the assignment listing and
/// module items
///
/// Optional sections are blanked according to the active profile's
/// assignment field toggles before the record leaves the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub key: ContentKey,
    pub course_id: CourseId,
    pub kind: AssignmentKind,
    pub source: RecordSource,

    /// Position within its module (module-derived when linked), else listing position
    pub position: u32,
    pub published: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<QuizId>,

    // basic info
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_possible: Option<f64>,

    // timestamps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    // submission metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grading_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_submitted_submissions: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<ModuleLink>,
}

impl AssignmentRecord {
    /// Empty record carrying only identity; callers fill in the rest
    pub fn new(key: ContentKey, course_id: CourseId, kind: AssignmentKind) -> Self {
        let quiz_id = match key {
            ContentKey::Quiz(id) => Some(id),
            ContentKey::Assignment(_) => None,
        };
        Self {
            key,
            course_id,
            kind,
            source: RecordSource::Listing,
            position: 0,
            published: true,
            quiz_id,
            name: None,
            points_possible: None,
            due_at: None,
            unlock_at: None,
            lock_at: None,
            created_at: None,
            updated_at: None,
            submission_types: None,
            grading_type: None,
            has_submitted_submissions: None,
            html_url: None,
            module: None,
        }
    }

    /// Backing assignment, if any
    pub fn assignment_id(&self) -> Option<AssignmentId> {
        match self.key {
            ContentKey::Assignment(id) => Some(id),
            ContentKey::Quiz(_) => None,
        }
    }

    pub fn is_quiz(&self) -> bool {
        self.kind == AssignmentKind::Quiz
    }

    /// True when the record was seen in the assignment listing
    pub fn is_backed_by_listing(&self) -> bool {
        matches!(self.source, RecordSource::Listing | RecordSource::Merged)
    }
}

/// A course module with the gradable items it contains, in item order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub id: ModuleId,
    pub course_id: CourseId,
    pub name: String,
    /// Display/processing order within the course
    pub position: u32,
    pub published: bool,
    pub unlock_at: Option<DateTime<Utc>>,
    pub items_count: u32,
    pub assignment_keys: Vec<ContentKey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let record = AssignmentRecord::new(
            ContentKey::Assignment(AssignmentId::new(1)),
            CourseId::new(2),
            AssignmentKind::Quiz,
        );
        assert!(record.is_quiz());
        assert_eq!(record.assignment_id(), Some(AssignmentId::new(1)));
        assert!(record.quiz_id.is_none());
        assert!(record.published);
        assert!(record.is_backed_by_listing());
        assert_eq!(record.position, 0);
    }

    #[test]
    fn test_blank_sections_are_omitted() {
        let record = AssignmentRecord::new(
            ContentKey::Assignment(AssignmentId::new(1)),
            CourseId::new(2),
            AssignmentKind::Assignment,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["key"], serde_json::json!({"type": "assignment", "id": 1}));
        assert_eq!(json["kind"], "assignment");
        assert_eq!(json["source"], "listing");
        assert!(json.get("name").is_none());
        assert!(json.get("module").is_none());
    }

    #[test]
    fn test_quiz_keys_carry_no_assignment() {
        let record = AssignmentRecord::new(
            ContentKey::Quiz(QuizId::new(77)),
            CourseId::new(2),
            AssignmentKind::Quiz,
        );
        assert_eq!(record.assignment_id(), None);
        assert_eq!(record.quiz_id, Some(QuizId::new(77)));
        assert_ne!(record.key, ContentKey::Assignment(AssignmentId::new(77)));
        assert_eq!(record.key.to_string(), "quiz 77");
    }
}
