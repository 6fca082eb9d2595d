//! Student enrollment collector
//!
//! Canvas does not reliably return the user's email in the same enrollment
//! response shape that carries the full profile and grades, so the roster is
//! read twice from the same endpoint: a primary call for profiles and scores,
//! then a secondary call whose only job is to backfill missing emails onto
//! the primary records.

use super::{empty_if_not_found, EntityCollector};
use crate::adapters::canvas::models::ApiEnrollment;
use crate::adapters::canvas::{CanvasGateway, QueryParams};
use crate::core::profile::CollectionProfile;
use crate::domain::{CourseId, Result, StudentRecord, UserId, UserProfile};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct EnrollmentCollector;

impl EnrollmentCollector {
    pub fn primary_params() -> QueryParams {
        QueryParams::new()
            .with_many("type", ["StudentEnrollment"])
            .with_many("include", ["total_scores"])
    }

    pub fn email_params() -> QueryParams {
        QueryParams::new()
            .with_many("type", ["StudentEnrollment"])
            .with_many("include", ["email"])
    }
}

#[async_trait]
impl EntityCollector for EnrollmentCollector {
    type Output = Vec<StudentRecord>;

    fn category(&self) -> &'static str {
        "students"
    }

    fn is_enabled(&self, profile: &CollectionProfile) -> bool {
        profile.collects_students()
    }

    async fn fetch(
        &self,
        gateway: &CanvasGateway,
        course_id: CourseId,
        profile: &CollectionProfile,
    ) -> Result<Self::Output> {
        let endpoint = format!("courses/{course_id}/enrollments");

        let primary: Vec<ApiEnrollment> = empty_if_not_found(
            gateway.collect_all_as(&endpoint, &Self::primary_params()).await,
            course_id,
            &endpoint,
        )?;
        let students: Vec<StudentRecord> = primary
            .into_iter()
            .map(|enrollment| student_record(enrollment, course_id))
            .collect();

        let missing_emails = students
            .iter()
            .filter(|s| !s.user.as_ref().is_some_and(UserProfile::has_email))
            .count();
        let email_lookup = profile.needs_email_lookup() && missing_emails > 0;

        let students = if email_lookup {
            let secondary: Vec<ApiEnrollment> = empty_if_not_found(
                gateway.collect_all_as(&endpoint, &Self::email_params()).await,
                course_id,
                &endpoint,
            )?;
            merge_email_backfill(students, secondary)
        } else {
            dedupe(students)
        };

        tracing::debug!(
            course_id = %course_id,
            students = students.len(),
            missing_emails_before = missing_emails,
            email_lookup,
            "Fetched enrollments"
        );
        Ok(students)
    }
}

fn student_record(enrollment: ApiEnrollment, course_id: CourseId) -> StudentRecord {
    let scores = enrollment.scores();
    let details = enrollment.details();
    StudentRecord {
        enrollment_id: enrollment.id,
        student_id: enrollment.user_id,
        course_id: enrollment.course_id.unwrap_or(course_id),
        user: enrollment.user.map(|u| u.into_profile()),
        scores: Some(scores),
        enrollment: Some(details),
        analytics: None,
    }
}

/// One record per student, keeping the first occurrence
fn dedupe(students: Vec<StudentRecord>) -> Vec<StudentRecord> {
    let mut seen = HashSet::new();
    students
        .into_iter()
        .filter(|s| seen.insert(s.student_id))
        .collect()
}

/// Backfills emails from the secondary listing onto the primary records
///
/// Primary records are never overwritten: only a missing or blank email is
/// filled in, and a secondary profile is used wholesale only when the
/// primary record carried no profile at all. Secondary-only students are
/// ignored.
pub fn merge_email_backfill(
    primary: Vec<StudentRecord>,
    secondary: Vec<ApiEnrollment>,
) -> Vec<StudentRecord> {
    let mut profiles: HashMap<UserId, UserProfile> = HashMap::new();
    for enrollment in secondary {
        if let Some(user) = enrollment.user {
            let profile = user.into_profile();
            let entry = profiles.entry(enrollment.user_id).or_insert_with(|| profile.clone());
            if !entry.has_email() && profile.has_email() {
                entry.email = profile.email;
            }
        }
    }

    dedupe(primary)
        .into_iter()
        .map(|mut student| {
            let Some(found) = profiles.get(&student.student_id) else {
                return student;
            };
            match student.user.as_mut() {
                Some(user) if !user.has_email() && found.has_email() => {
                    user.email = found.email.clone();
                }
                Some(_) => {}
                None => student.user = Some(found.clone()),
            }
            student
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn enrollment(value: serde_json::Value) -> ApiEnrollment {
        serde_json::from_value(value).unwrap()
    }

    fn primary() -> Vec<StudentRecord> {
        vec![student_record(
            enrollment(json!({
                "id": 1,
                "user_id": 10,
                "grades": {"current_score": 90.0, "final_score": 90.0},
                "user": {"id": 10, "name": "Ada Lovelace", "sortable_name": "Lovelace, Ada", "email": ""}
            })),
            CourseId::new(5),
        )]
    }

    #[test]
    fn test_email_is_backfilled_without_clobbering() {
        let secondary = vec![enrollment(json!({
            "id": 1,
            "user_id": 10,
            "user": {"id": 10, "name": "A. Lovelace", "email": "ada@example.edu"}
        }))];

        let merged = merge_email_backfill(primary(), secondary);
        let user = merged[0].user.as_ref().unwrap();

        assert_eq!(user.email.as_deref(), Some("ada@example.edu"));
        assert_eq!(user.sortable_name.as_deref(), Some("Lovelace, Ada"));
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(merged[0].current_score(), Some(90.0));
    }

    #[test]
    fn test_existing_email_wins() {
        let mut students = primary();
        students[0].user.as_mut().unwrap().email = Some("primary@example.edu".to_string());
        let secondary = vec![enrollment(json!({
            "id": 1,
            "user_id": 10,
            "user": {"id": 10, "email": "secondary@example.edu"}
        }))];

        let merged = merge_email_backfill(students, secondary);
        assert_eq!(
            merged[0].user.as_ref().unwrap().email.as_deref(),
            Some("primary@example.edu")
        );
    }

    #[test]
    fn test_secondary_only_students_are_ignored_and_duplicates_dropped() {
        let mut students = primary();
        students.push(students[0].clone());
        let secondary = vec![enrollment(json!({
            "id": 2,
            "user_id": 11,
            "user": {"id": 11, "email": "other@example.edu"}
        }))];

        let merged = merge_email_backfill(students, secondary);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].student_id, UserId::new(10));
        assert!(!merged[0].user.as_ref().unwrap().has_email());
    }

    #[test]
    fn test_missing_profile_taken_from_secondary() {
        let mut students = primary();
        students[0].user = None;
        let secondary = vec![enrollment(json!({
            "id": 1,
            "user_id": 10,
            "user": {"id": 10, "name": "Ada", "email": "ada@example.edu"}
        }))];

        let merged = merge_email_backfill(students, secondary);
        assert!(merged[0].user.as_ref().unwrap().has_email());
    }

    #[test]
    fn test_record_falls_back_to_requested_course() {
        let record = &primary()[0];
        assert_eq!(record.course_id, CourseId::new(5));
        assert!(record.enrollment.is_some());
        assert!(record.analytics.is_none());
    }
}
