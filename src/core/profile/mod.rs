//! Collection profiles
//!
//! A [`CollectionProfile`] decides which entity categories a sync collects,
//! which fields survive into the output records, and which optional
//! processing passes run. It is a plain value: chosen once when an
//! orchestrator is built and never changed during a run.
//!
//! Profiles are usually taken from a [`ProfilePreset`] and adjusted with a
//! partial [`ProfileOverride`]:
//!
//! ```rust
//! use canvas_sync::core::profile::{CollectionProfile, ProfileOverride, ProfilePreset};
//!
//! let mut overrides = ProfileOverride::default();
//! overrides.processing.include_unpublished = Some(true);
//!
//! let profile = CollectionProfile::merged(&ProfilePreset::Lightweight.profile(), &overrides);
//! assert!(profile.processing.include_unpublished);
//! assert!(!profile.student_fields.analytics);
//! ```

pub mod impact;
pub mod presets;

pub use impact::{estimate_performance_impact, ImpactLevel};
pub use presets::ProfilePreset;

use serde::{Deserialize, Serialize};

/// Entity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryToggles {
    pub course: bool,
    pub students: bool,
    pub assignments: bool,
    pub modules: bool,
    /// Per-student grade data: score output and the analytics pass
    pub grades: bool,
}

/// Student record sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFields {
    /// User profile: names, login, email
    pub basic_info: bool,
    pub scores: bool,
    /// Submitted/missing split from the analytics endpoint
    pub analytics: bool,
    pub enrollment_details: bool,
}

/// Assignment record sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentFields {
    pub basic_info: bool,
    pub timestamps: bool,
    pub submission_info: bool,
    pub urls: bool,
    pub module_linkage: bool,
}

/// Optional processing passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingOptions {
    /// Request module item content details (due/lock dates, points)
    pub enrich_with_timestamps: bool,
    /// Drop quizzes that are not backed by a graded assignment
    pub filter_ungraded_quizzes: bool,
    /// Map quiz module items onto their assignment-listing record
    pub resolve_quiz_assignments: bool,
    pub include_unpublished: bool,
}

/// Complete collection profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionProfile {
    pub categories: CategoryToggles,
    pub student_fields: StudentFields,
    pub assignment_fields: AssignmentFields,
    pub processing: ProcessingOptions,
}

impl Default for CollectionProfile {
    fn default() -> Self {
        ProfilePreset::Full.profile()
    }
}

impl CollectionProfile {
    /// Field-by-field merge: set override fields win, unset ones inherit from `base`
    pub fn merged(base: &CollectionProfile, overrides: &ProfileOverride) -> CollectionProfile {
        CollectionProfile {
            categories: overrides.categories.apply(&base.categories),
            student_fields: overrides.student_fields.apply(&base.student_fields),
            assignment_fields: overrides.assignment_fields.apply(&base.assignment_fields),
            processing: overrides.processing.apply(&base.processing),
        }
    }

    pub fn collects_course(&self) -> bool {
        self.categories.course
    }

    pub fn collects_students(&self) -> bool {
        self.categories.students
    }

    pub fn collects_assignments(&self) -> bool {
        self.categories.assignments
    }

    pub fn collects_modules(&self) -> bool {
        self.categories.modules
    }

    /// The second enrollment call only exists to recover email addresses
    pub fn needs_email_lookup(&self) -> bool {
        self.categories.students && self.student_fields.basic_info
    }

    /// Scores survive into the output only when grades are collected
    pub fn outputs_scores(&self) -> bool {
        self.categories.grades && self.student_fields.scores
    }

    /// Whether the per-student analytics pass runs at all
    pub fn runs_analytics(&self) -> bool {
        self.categories.students && self.categories.grades && self.student_fields.analytics
    }
}

/// Partial category override
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryOverride {
    pub course: Option<bool>,
    pub students: Option<bool>,
    pub assignments: Option<bool>,
    pub modules: Option<bool>,
    pub grades: Option<bool>,
}

impl CategoryOverride {
    fn apply(&self, base: &CategoryToggles) -> CategoryToggles {
        CategoryToggles {
            course: self.course.unwrap_or(base.course),
            students: self.students.unwrap_or(base.students),
            assignments: self.assignments.unwrap_or(base.assignments),
            modules: self.modules.unwrap_or(base.modules),
            grades: self.grades.unwrap_or(base.grades),
        }
    }
}

/// Partial student field override
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentFieldsOverride {
    pub basic_info: Option<bool>,
    pub scores: Option<bool>,
    pub analytics: Option<bool>,
    pub enrollment_details: Option<bool>,
}

impl StudentFieldsOverride {
    fn apply(&self, base: &StudentFields) -> StudentFields {
        StudentFields {
            basic_info: self.basic_info.unwrap_or(base.basic_info),
            scores: self.scores.unwrap_or(base.scores),
            analytics: self.analytics.unwrap_or(base.analytics),
            enrollment_details: self.enrollment_details.unwrap_or(base.enrollment_details),
        }
    }
}

/// Partial assignment field override
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentFieldsOverride {
    pub basic_info: Option<bool>,
    pub timestamps: Option<bool>,
    pub submission_info: Option<bool>,
    pub urls: Option<bool>,
    pub module_linkage: Option<bool>,
}

impl AssignmentFieldsOverride {
    fn apply(&self, base: &AssignmentFields) -> AssignmentFields {
        AssignmentFields {
            basic_info: self.basic_info.unwrap_or(base.basic_info),
            timestamps: self.timestamps.unwrap_or(base.timestamps),
            submission_info: self.submission_info.unwrap_or(base.submission_info),
            urls: self.urls.unwrap_or(base.urls),
            module_linkage: self.module_linkage.unwrap_or(base.module_linkage),
        }
    }
}

/// Partial processing override
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOverride {
    pub enrich_with_timestamps: Option<bool>,
    pub filter_ungraded_quizzes: Option<bool>,
    pub resolve_quiz_assignments: Option<bool>,
    pub include_unpublished: Option<bool>,
}

impl ProcessingOverride {
    fn apply(&self, base: &ProcessingOptions) -> ProcessingOptions {
        ProcessingOptions {
            enrich_with_timestamps: self
                .enrich_with_timestamps
                .unwrap_or(base.enrich_with_timestamps),
            filter_ungraded_quizzes: self
                .filter_ungraded_quizzes
                .unwrap_or(base.filter_ungraded_quizzes),
            resolve_quiz_assignments: self
                .resolve_quiz_assignments
                .unwrap_or(base.resolve_quiz_assignments),
            include_unpublished: self.include_unpublished.unwrap_or(base.include_unpublished),
        }
    }
}

/// Partial profile; any field left `None` inherits from the base profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOverride {
    pub categories: CategoryOverride,
    pub student_fields: StudentFieldsOverride,
    pub assignment_fields: AssignmentFieldsOverride,
    pub processing: ProcessingOverride,
}

impl ProfileOverride {
    /// True when the override changes nothing
    pub fn is_empty(&self) -> bool {
        *self == ProfileOverride::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_override_is_identity() {
        for preset in ProfilePreset::all() {
            let base = preset.profile();
            assert_eq!(CollectionProfile::merged(&base, &ProfileOverride::default()), base);
        }
        assert!(ProfileOverride::default().is_empty());
    }

    #[test]
    fn test_override_wins_field_by_field() {
        let base = ProfilePreset::Full.profile();
        let mut overrides = ProfileOverride::default();
        overrides.categories.modules = Some(false);
        overrides.assignment_fields.urls = Some(false);

        let merged = CollectionProfile::merged(&base, &overrides);

        assert!(!merged.categories.modules);
        assert!(!merged.assignment_fields.urls);
        // Untouched fields inherit
        assert_eq!(merged.categories.students, base.categories.students);
        assert_eq!(merged.assignment_fields.timestamps, base.assignment_fields.timestamps);
        assert_eq!(merged.processing, base.processing);
        assert_eq!(merged.student_fields, base.student_fields);
    }

    #[test]
    fn test_override_deserializes_from_partial_toml() {
        let overrides: ProfileOverride = toml::from_str(
            r#"
[student_fields]
analytics = false

[processing]
include_unpublished = true
"#,
        )
        .unwrap();

        assert_eq!(overrides.student_fields.analytics, Some(false));
        assert_eq!(overrides.student_fields.scores, None);
        assert_eq!(overrides.processing.include_unpublished, Some(true));
        assert_eq!(overrides.categories, CategoryOverride::default());
    }

    #[test]
    fn test_analytics_requires_students_and_grades() {
        let mut profile = ProfilePreset::Full.profile();
        assert!(profile.runs_analytics());

        profile.categories.grades = false;
        assert!(!profile.runs_analytics());
        assert!(!profile.outputs_scores());

        profile.categories.grades = true;
        profile.categories.students = false;
        assert!(!profile.runs_analytics());
        assert!(!profile.needs_email_lookup());
    }
}
