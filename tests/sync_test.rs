//! Single-course sync against a mock Canvas server

mod common;

use canvas_sync::core::profile::{CollectionProfile, ProfilePreset};
use canvas_sync::core::sync::CourseSynchronizer;
use canvas_sync::domain::{
    AnalyticsOutcome, AssignmentId, AssignmentKind, Course, CourseId, RecordSource, SyncStage,
    UserId,
};
use common::{json_body, query, test_gateway};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};

const COURSE: u64 = 101;

async fn mock_json(
    server: &mut ServerGuard,
    path: &str,
    pairs: &[(&str, &str)],
    body: Value,
    hits: usize,
) -> Mock {
    server
        .mock("GET", path)
        .match_query(query(pairs))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json_body(body))
        .expect(hits)
        .create_async()
        .await
}

fn enrollment(
    id: u64,
    user_id: u64,
    email: Option<&str>,
    current: f64,
    final_score: f64,
) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "course_id": COURSE,
        "type": "StudentEnrollment",
        "enrollment_state": "active",
        "grades": {"current_score": current, "final_score": final_score},
        "user": {
            "id": user_id,
            "name": format!("Student {user_id}"),
            "sortable_name": format!("{user_id}, Student"),
            "email": email
        }
    })
}

fn students_only_without_course() -> CollectionProfile {
    let mut profile = ProfilePreset::Lightweight.profile();
    profile.categories.course = false;
    profile.categories.assignments = false;
    profile.categories.modules = false;
    profile
}

#[tokio::test]
async fn test_full_profile_course_sync() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    let course = mock_json(
        &mut server,
        "/api/v1/courses/101",
        &[("include[]", "term")],
        json!({
            "id": COURSE,
            "name": "Introduction to Biology",
            "course_code": "BIO-101",
            "workflow_state": "available",
            "term": {"name": "Fall 2025"}
        }),
        1,
    )
    .await;

    let roster = mock_json(
        &mut server,
        "/api/v1/courses/101/enrollments",
        &[("type[]", "StudentEnrollment"), ("include[]", "total_scores")],
        json!([
            enrollment(1, 1001, Some("ada@example.edu"), 85.0, 85.0),
            enrollment(2, 1002, Some("alan@example.edu"), 80.0, 70.0)
        ]),
        1,
    )
    .await;
    let email_lookup = mock_json(
        &mut server,
        "/api/v1/courses/101/enrollments",
        &[("include[]", "email")],
        json!([]),
        0,
    )
    .await;

    let skipped_analytics = mock_json(
        &mut server,
        "/api/v1/courses/101/analytics/users/1001/assignments",
        &[],
        json!([]),
        0,
    )
    .await;
    let fetched_analytics = mock_json(
        &mut server,
        "/api/v1/courses/101/analytics/users/1002/assignments",
        &[],
        json!([
            {"assignment_id": 501, "title": "Essay", "status": "on_time", "points_possible": 10,
             "submission": {"score": 8, "submitted_at": "2025-09-10T12:00:00Z"}},
            {"assignment_id": 502, "title": "Quiz 1", "status": "missing", "points_possible": 5,
             "submission": {"score": null}}
        ]),
        1,
    )
    .await;

    let assignments = mock_json(
        &mut server,
        "/api/v1/courses/101/assignments",
        &[("order_by", "position")],
        json!([
            {"id": 501, "name": "Essay", "points_possible": 10, "position": 1,
             "published": true, "grading_type": "points", "submission_types": ["online_text_entry"]},
            {"id": 502, "name": "Quiz 1", "points_possible": 5, "position": 2,
             "published": true, "grading_type": "points", "quiz_id": 77,
             "is_quiz_assignment": true, "submission_types": ["online_quiz"]}
        ]),
        1,
    )
    .await;

    let modules = mock_json(
        &mut server,
        "/api/v1/courses/101/modules",
        &[("include[]", "items"), ("include[]", "content_details")],
        json!([
            {"id": 11, "name": "Week 2", "position": 2, "published": true, "items_count": 1,
             "items": [
                {"id": 21, "type": "Quiz", "title": "Quiz 1", "position": 1, "published": true,
                 "content_id": 77, "url": format!("{base}/api/v1/courses/101/quizzes/77")}
             ]},
            {"id": 10, "name": "Week 1", "position": 1, "published": true, "items_count": 2,
             "items": [
                {"id": 20, "type": "Assignment", "title": "Essay", "position": 1, "published": true,
                 "content_id": 501, "url": format!("{base}/api/v1/courses/101/assignments/501"),
                 "content_details": {"points_possible": 10, "due_at": "2025-09-12T23:59:00Z"}},
                {"id": 22, "type": "Page", "title": "Reading", "position": 2, "published": true}
             ]}
        ]),
        1,
    )
    .await;

    let synchronizer = CourseSynchronizer::new(test_gateway(&base), ProfilePreset::Full.profile());
    let graph = synchronizer.sync_course(CourseId::new(COURSE)).await.unwrap();

    assert!(graph.is_ready());
    assert_eq!(graph.course.as_ref().map(|c| c.name.as_str()), Some("Introduction to Biology"));

    // Modules ordered by position; the page item is not an assignment
    let module_ids: Vec<u64> = graph.modules.iter().map(|m| m.id.get()).collect();
    assert_eq!(module_ids, vec![10, 11]);
    assert_eq!(graph.modules[0].assignment_keys.len(), 1);

    assert_eq!(graph.assignments.len(), 2);
    let essay = &graph.assignments[0];
    assert_eq!(essay.assignment_id(), Some(AssignmentId::new(501)));
    assert_eq!(essay.source, RecordSource::Merged);
    assert!(essay.due_at.is_some());
    let quiz = &graph.assignments[1];
    assert_eq!(quiz.assignment_id(), Some(AssignmentId::new(502)));
    assert_eq!(quiz.kind, AssignmentKind::Quiz);
    assert_eq!(quiz.module.as_ref().map(|m| m.module_id.get()), Some(11));

    assert_eq!(graph.students.len(), 2);
    let ada = graph
        .students
        .iter()
        .find(|s| s.student_id == UserId::new(1001))
        .unwrap();
    let alan = graph
        .students
        .iter()
        .find(|s| s.student_id == UserId::new(1002))
        .unwrap();
    assert_eq!(ada.analytics_outcome(), AnalyticsOutcome::Skipped);
    assert_eq!(alan.analytics_outcome(), AnalyticsOutcome::Fetched);
    let analytics = alan.analytics.as_ref().unwrap();
    assert_eq!(analytics.submitted.len(), 1);
    assert_eq!(analytics.missing.len(), 1);

    assert_eq!(graph.enrollment_statuses.len(), 2);
    assert_eq!(graph.metrics.analytics.calls_made, 1);
    assert_eq!(graph.metrics.analytics.calls_skipped, 1);
    assert_eq!(graph.metrics.api_calls, 5);
    assert_eq!(graph.metrics.stages.len(), 4);

    course.assert_async().await;
    roster.assert_async().await;
    email_lookup.assert_async().await;
    skipped_analytics.assert_async().await;
    fetched_analytics.assert_async().await;
    assignments.assert_async().await;
    modules.assert_async().await;
}

#[tokio::test]
async fn test_missing_emails_are_backfilled_from_second_call() {
    let mut server = mockito::Server::new_async().await;

    let primary = mock_json(
        &mut server,
        "/api/v1/courses/101/enrollments",
        &[("include[]", "total_scores")],
        json!([
            enrollment(1, 1001, Some("ada@example.edu"), 90.0, 90.0),
            enrollment(2, 1002, None, 75.0, 75.0)
        ]),
        1,
    )
    .await;
    let secondary = mock_json(
        &mut server,
        "/api/v1/courses/101/enrollments",
        &[("type[]", "StudentEnrollment"), ("include[]", "email")],
        json!([
            {"id": 1, "user_id": 1001, "user": {"id": 1001, "email": "other@example.edu"}},
            {"id": 2, "user_id": 1002, "user": {"id": 1002, "email": "alan@example.edu"}},
            {"id": 3, "user_id": 1003, "user": {"id": 1003, "email": "stray@example.edu"}}
        ]),
        1,
    )
    .await;

    let synchronizer =
        CourseSynchronizer::new(test_gateway(&server.url()), students_only_without_course());
    let graph = synchronizer.sync_course(CourseId::new(COURSE)).await.unwrap();

    let emails: Vec<Option<&str>> = graph
        .students
        .iter()
        .map(|s| s.user.as_ref().and_then(|u| u.email.as_deref()))
        .collect();
    // Existing emails are kept; secondary-only students are ignored
    assert_eq!(emails, vec![Some("ada@example.edu"), Some("alan@example.edu")]);
    let alan = graph.students[1].user.as_ref().unwrap();
    assert_eq!(alan.sortable_name.as_deref(), Some("1002, Student"));
    assert_eq!(graph.metrics.api_calls, 2);

    primary.assert_async().await;
    secondary.assert_async().await;
}

#[tokio::test]
async fn test_disabled_categories_make_no_calls() {
    let server = mockito::Server::new_async().await;

    let mut profile = ProfilePreset::Full.profile();
    profile.categories.course = false;
    profile.categories.students = false;
    profile.categories.assignments = false;
    profile.categories.modules = false;

    let synchronizer = CourseSynchronizer::new(test_gateway(&server.url()), profile);
    let graph = synchronizer.sync_course(CourseId::new(COURSE)).await.unwrap();

    assert!(graph.course.is_none());
    assert!(graph.students.is_empty());
    assert!(graph.assignments.is_empty());
    assert!(graph.modules.is_empty());
    assert_eq!(graph.metrics.api_calls, 0);
    assert_eq!(synchronizer.gateway().calls_issued(), 0);
}

#[tokio::test]
async fn test_known_course_record_is_reused() {
    let mut server = mockito::Server::new_async().await;
    let course_call =
        mock_json(&mut server, "/api/v1/courses/101", &[], json!({"id": COURSE}), 0).await;

    let mut profile = ProfilePreset::AssignmentsOnly.profile();
    profile.categories.assignments = false;
    profile.categories.modules = false;

    let known = Course {
        id: CourseId::new(COURSE),
        name: "Chemistry".to_string(),
        course_code: "CHEM-1".to_string(),
        calendar_ics: None,
        workflow_state: "available".to_string(),
        term_name: None,
        total_students: None,
        start_at: None,
        end_at: None,
        created_at: None,
        updated_at: None,
    };

    let synchronizer = CourseSynchronizer::new(test_gateway(&server.url()), profile);
    let graph = synchronizer
        .sync_course_with(CourseId::new(COURSE), Some(known))
        .await
        .unwrap();

    assert_eq!(graph.course.map(|c| c.name), Some("Chemistry".to_string()));
    assert_eq!(graph.metrics.api_calls, 0);
    course_call.assert_async().await;
}

#[tokio::test]
async fn test_missing_course_fails_at_course_info() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/courses/404")
        .match_query(query(&[("include[]", "term")]))
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let synchronizer =
        CourseSynchronizer::new(test_gateway(&server.url()), ProfilePreset::Full.profile());
    let err = synchronizer
        .sync_course(CourseId::new(404))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(SyncStage::CourseInfo));
    assert!(err.is_not_found());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_roster_failure_fails_at_enrollments() {
    let mut server = mockito::Server::new_async().await;
    let course = mock_json(
        &mut server,
        "/api/v1/courses/101",
        &[("include[]", "term")],
        json!({"id": COURSE}),
        1,
    )
    .await;
    let roster = server
        .mock("GET", "/api/v1/courses/101/enrollments")
        .match_query(query(&[("include[]", "total_scores")]))
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let synchronizer = CourseSynchronizer::new(
        test_gateway(&server.url()),
        ProfilePreset::StudentsOnly.profile(),
    );
    let err = synchronizer
        .sync_course(CourseId::new(COURSE))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(SyncStage::Enrollments));
    assert!(!err.is_rate_limit());
    course.assert_async().await;
    roster.assert_async().await;
}

#[tokio::test]
async fn test_missing_module_listing_counts_as_empty() {
    let mut server = mockito::Server::new_async().await;
    let modules = server
        .mock("GET", "/api/v1/courses/101/modules")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"errors":[{"message":"The specified resource does not exist."}]}"#)
        .expect(1)
        .create_async()
        .await;
    let assignments = mock_json(
        &mut server,
        "/api/v1/courses/101/assignments",
        &[("order_by", "position")],
        json!([{"id": 601, "name": "Lab 1", "points_possible": 5, "published": true}]),
        1,
    )
    .await;

    let mut profile = ProfilePreset::AssignmentsOnly.profile();
    profile.categories.course = false;

    let synchronizer = CourseSynchronizer::new(test_gateway(&server.url()), profile);
    let graph = synchronizer.sync_course(CourseId::new(COURSE)).await.unwrap();

    assert!(graph.modules.is_empty());
    assert_eq!(graph.assignments.len(), 1);
    assert_eq!(graph.assignments[0].assignment_id(), Some(AssignmentId::new(601)));
    assert_eq!(graph.assignments[0].source, RecordSource::Listing);
    assert_eq!(graph.metrics.api_calls, 2);

    modules.assert_async().await;
    assignments.assert_async().await;
}

#[tokio::test]
async fn test_missing_roster_counts_as_empty() {
    let mut server = mockito::Server::new_async().await;
    let roster = server
        .mock("GET", "/api/v1/courses/101/enrollments")
        .match_query(Matcher::Any)
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let synchronizer =
        CourseSynchronizer::new(test_gateway(&server.url()), students_only_without_course());
    let graph = synchronizer.sync_course(CourseId::new(COURSE)).await.unwrap();

    assert!(graph.students.is_empty());
    assert!(graph.enrollment_statuses.is_empty());
    assert_eq!(graph.metrics.api_calls, 1);
    roster.assert_async().await;
}
