//! Named collection presets
//!
//! Each preset is a common tradeoff point between completeness and call
//! count.

use super::{AssignmentFields, CategoryToggles, CollectionProfile, ProcessingOptions, StudentFields};
use crate::domain::SyncError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in profile presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilePreset {
    /// Everything, including per-student analytics
    Full,
    /// Course and roster with grades; no assignment or module listings
    StudentsOnly,
    /// Course structure only; no enrollment calls at all
    AssignmentsOnly,
    /// Roster and structure without analytics or enrichment
    Lightweight,
    /// Roster, grades, analytics and assignments; modules skipped
    Analytics,
}

impl ProfilePreset {
    pub fn all() -> [ProfilePreset; 5] {
        [
            ProfilePreset::Full,
            ProfilePreset::StudentsOnly,
            ProfilePreset::AssignmentsOnly,
            ProfilePreset::Lightweight,
            ProfilePreset::Analytics,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfilePreset::Full => "full",
            ProfilePreset::StudentsOnly => "students_only",
            ProfilePreset::AssignmentsOnly => "assignments_only",
            ProfilePreset::Lightweight => "lightweight",
            ProfilePreset::Analytics => "analytics",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProfilePreset::Full => "Course, roster, grades, analytics, modules and assignments",
            ProfilePreset::StudentsOnly => "Course and roster with grades and analytics",
            ProfilePreset::AssignmentsOnly => "Course, modules and assignments; no roster",
            ProfilePreset::Lightweight => "Roster and structure, no analytics or enrichment",
            ProfilePreset::Analytics => "Roster, grades, analytics and assignment listing",
        }
    }

    /// Materializes the preset
    pub fn profile(&self) -> CollectionProfile {
        match self {
            ProfilePreset::Full => CollectionProfile {
                categories: CategoryToggles {
                    course: true,
                    students: true,
                    assignments: true,
                    modules: true,
                    grades: true,
                },
                student_fields: StudentFields {
                    basic_info: true,
                    scores: true,
                    analytics: true,
                    enrollment_details: true,
                },
                assignment_fields: all_assignment_fields(),
                processing: ProcessingOptions {
                    enrich_with_timestamps: true,
                    filter_ungraded_quizzes: true,
                    resolve_quiz_assignments: true,
                    include_unpublished: false,
                },
            },
            ProfilePreset::StudentsOnly => CollectionProfile {
                categories: CategoryToggles {
                    course: true,
                    students: true,
                    assignments: false,
                    modules: false,
                    grades: true,
                },
                student_fields: StudentFields {
                    basic_info: true,
                    scores: true,
                    analytics: true,
                    enrollment_details: true,
                },
                assignment_fields: all_assignment_fields(),
                processing: ProcessingOptions {
                    enrich_with_timestamps: false,
                    filter_ungraded_quizzes: false,
                    resolve_quiz_assignments: false,
                    include_unpublished: false,
                },
            },
            ProfilePreset::AssignmentsOnly => CollectionProfile {
                categories: CategoryToggles {
                    course: true,
                    students: false,
                    assignments: true,
                    modules: true,
                    grades: false,
                },
                student_fields: StudentFields {
                    basic_info: false,
                    scores: false,
                    analytics: false,
                    enrollment_details: false,
                },
                assignment_fields: all_assignment_fields(),
                processing: ProcessingOptions {
                    enrich_with_timestamps: true,
                    filter_ungraded_quizzes: true,
                    resolve_quiz_assignments: true,
                    include_unpublished: false,
                },
            },
            ProfilePreset::Lightweight => CollectionProfile {
                categories: CategoryToggles {
                    course: true,
                    students: true,
                    assignments: true,
                    modules: true,
                    grades: true,
                },
                student_fields: StudentFields {
                    basic_info: true,
                    scores: true,
                    analytics: false,
                    enrollment_details: false,
                },
                assignment_fields: AssignmentFields {
                    basic_info: true,
                    timestamps: false,
                    submission_info: false,
                    urls: false,
                    module_linkage: true,
                },
                processing: ProcessingOptions {
                    enrich_with_timestamps: false,
                    filter_ungraded_quizzes: true,
                    resolve_quiz_assignments: true,
                    include_unpublished: false,
                },
            },
            ProfilePreset::Analytics => CollectionProfile {
                categories: CategoryToggles {
                    course: true,
                    students: true,
                    assignments: true,
                    modules: false,
                    grades: true,
                },
                student_fields: StudentFields {
                    basic_info: true,
                    scores: true,
                    analytics: true,
                    enrollment_details: true,
                },
                assignment_fields: AssignmentFields {
                    basic_info: true,
                    timestamps: true,
                    submission_info: true,
                    urls: false,
                    module_linkage: false,
                },
                processing: ProcessingOptions {
                    enrich_with_timestamps: false,
                    filter_ungraded_quizzes: true,
                    resolve_quiz_assignments: false,
                    include_unpublished: false,
                },
            },
        }
    }
}

fn all_assignment_fields() -> AssignmentFields {
    AssignmentFields {
        basic_info: true,
        timestamps: true,
        submission_info: true,
        urls: true,
        module_linkage: true,
    }
}

impl fmt::Display for ProfilePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfilePreset {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "full" => Ok(ProfilePreset::Full),
            "students_only" | "students" => Ok(ProfilePreset::StudentsOnly),
            "assignments_only" | "assignments" => Ok(ProfilePreset::AssignmentsOnly),
            "lightweight" | "light" => Ok(ProfilePreset::Lightweight),
            "analytics" => Ok(ProfilePreset::Analytics),
            _ => Err(SyncError::Configuration(format!(
                "Unknown profile preset '{s}'. Must be one of: full, students_only, \
                 assignments_only, lightweight, analytics"
            ))),
        }
    }
}
