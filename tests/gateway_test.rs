//! Gateway behaviour against a mock Canvas server

mod common;

use canvas_sync::adapters::canvas::{CanvasGateway, QueryParams};
use canvas_sync::config::ExhaustionMode;
use canvas_sync::domain::CanvasError;
use common::{json_body, query, test_canvas_config, test_gateway, TEST_TOKEN};
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_send_uses_bearer_token_and_repeated_array_keys() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/courses/101")
        .match_header("authorization", format!("Bearer {TEST_TOKEN}").as_str())
        .match_query(query(&[("include[]", "term"), ("include[]", "total_students")]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json_body(json!({"id": 101, "name": "Biology"})))
        .expect(1)
        .create_async()
        .await;

    let gateway = test_gateway(&server.url());
    let params = QueryParams::new().with_many("include", ["term", "total_students"]);
    let response = gateway.send("courses/101", &params).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body["name"], "Biology");
    assert_eq!(gateway.calls_issued(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_errors_are_retried_until_exhausted() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/courses/7")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("unavailable")
        .expect(3)
        .create_async()
        .await;

    let gateway = test_gateway(&server.url());
    let err = gateway
        .send("courses/7", &QueryParams::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err.canvas_error(),
        Some(CanvasError::ServerError { status: 503, .. })
    ));
    // Every attempt counts against the budget
    assert_eq!(gateway.calls_issued(), 3);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_throttling_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/courses/7")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body("403 Forbidden (Rate Limit Exceeded)")
        .expect(1)
        .create_async()
        .await;

    let gateway = test_gateway(&server.url());
    let err = gateway
        .send("courses/7", &QueryParams::new())
        .await
        .unwrap_err();

    assert!(err.is_rate_limit());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_not_found_is_classified() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/courses/404")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"errors":[{"message":"The specified resource does not exist."}]}"#)
        .expect(1)
        .create_async()
        .await;

    let gateway = test_gateway(&server.url());
    let err = gateway
        .send("courses/404", &QueryParams::new())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(!err.is_rate_limit());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_budget_refuses_calls_past_the_ceiling() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/users/self")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json_body(json!({"id": 1})))
        .expect(2)
        .create_async()
        .await;

    let mut config = test_canvas_config(&server.url());
    config.rate_limit.requests_per_hour = 2;
    config.rate_limit.on_exhausted = ExhaustionMode::Fail;
    let gateway = CanvasGateway::new(&config).unwrap();

    gateway.send("users/self", &QueryParams::new()).await.unwrap();
    gateway.send("users/self", &QueryParams::new()).await.unwrap();
    let err = gateway
        .send("users/self", &QueryParams::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err.canvas_error(),
        Some(CanvasError::BudgetExhausted { used: 2, limit: 2 })
    ));
    assert_eq!(gateway.budget().remaining(), 0);
    mock.assert_async().await;

    gateway.reset();
    assert_eq!(gateway.calls_issued(), 0);
    assert_eq!(gateway.budget().remaining(), 2);
}

#[tokio::test]
async fn test_metrics_track_outcomes_and_remaining_header() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("GET", "/api/v1/courses/1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("x-rate-limit-remaining", "612.5")
        .with_body(json_body(json!({"id": 1})))
        .expect(1)
        .create_async()
        .await;
    let missing = server
        .mock("GET", "/api/v1/courses/2")
        .match_query(Matcher::Any)
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let gateway = test_gateway(&server.url());
    gateway.send("courses/1", &QueryParams::new()).await.unwrap();
    assert!(gateway.send("courses/2", &QueryParams::new()).await.is_err());

    let snapshot = gateway.metrics().snapshot();
    assert_eq!(snapshot.total_calls, 2);
    assert_eq!(snapshot.successful_calls, 1);
    assert_eq!(snapshot.failed_calls, 1);
    assert!((snapshot.success_rate - 0.5).abs() < f64::EPSILON);
    assert_eq!(snapshot.rate_limit_remaining, Some(612.5));

    let recent = gateway.metrics().recent(10);
    assert_eq!(recent.len(), 2);
    assert!(recent[0].success);
    assert!(!recent[1].success);

    ok.assert_async().await;
    missing.assert_async().await;
}

#[tokio::test]
async fn test_scoped_gateways_share_one_budget() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/courses/1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{}")
        .expect(3)
        .create_async()
        .await;

    let gateway = test_gateway(&server.url());
    let first = gateway.scoped();
    let second = gateway.scoped();

    first.send("courses/1", &QueryParams::new()).await.unwrap();
    second.send("courses/1", &QueryParams::new()).await.unwrap();
    second.send("courses/1", &QueryParams::new()).await.unwrap();

    assert_eq!(first.calls_issued(), 1);
    assert_eq!(second.calls_issued(), 2);
    assert_eq!(gateway.calls_issued(), 3);
    mock.assert_async().await;
}
