//! Rough performance-impact estimate for a profile
//!
//! The score is guidance for choosing a profile. Nothing in the sync path
//! reads it.

use super::CollectionProfile;
use serde::Serialize;
use std::fmt;

const WEIGHT_COURSE: f64 = 0.05;
const WEIGHT_STUDENTS: f64 = 0.20;
const WEIGHT_ASSIGNMENTS: f64 = 0.15;
const WEIGHT_MODULES: f64 = 0.15;
const WEIGHT_GRADES: f64 = 0.10;
const WEIGHT_STUDENT_ANALYTICS: f64 = 0.20;
const WEIGHT_TIMESTAMP_ENRICHMENT: f64 = 0.10;
const WEIGHT_QUIZ_RESOLUTION: f64 = 0.05;

/// Coarse bucket for an impact score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 0.35 {
            ImpactLevel::Low
        } else if score < 0.7 {
            ImpactLevel::Medium
        } else {
            ImpactLevel::High
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImpactLevel::Low => f.write_str("low"),
            ImpactLevel::Medium => f.write_str("medium"),
            ImpactLevel::High => f.write_str("high"),
        }
    }
}

/// Weighted sum of enabled categories and costly flags, in `[0, 1]`
///
/// Analytics only counts when the pass would actually run, and timestamp
/// enrichment and quiz resolution only count when modules are collected.
pub fn estimate_performance_impact(profile: &CollectionProfile) -> f64 {
    let c = &profile.categories;
    let weighted = [
        (c.course, WEIGHT_COURSE),
        (c.students, WEIGHT_STUDENTS),
        (c.assignments, WEIGHT_ASSIGNMENTS),
        (c.modules, WEIGHT_MODULES),
        (c.grades, WEIGHT_GRADES),
        (profile.runs_analytics(), WEIGHT_STUDENT_ANALYTICS),
        (
            c.modules && profile.processing.enrich_with_timestamps,
            WEIGHT_TIMESTAMP_ENRICHMENT,
        ),
        (
            c.modules && profile.processing.resolve_quiz_assignments,
            WEIGHT_QUIZ_RESOLUTION,
        ),
    ];

    let score: f64 = weighted
        .iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, weight)| weight)
        .sum();

    score.clamp(0.0, 1.0)
}
