//! API Integration Tests
//!
//! Tests run against a spawned server backed by the in-memory store.
//! The `postgres_` variants additionally need a database:
//! - Environment variable: DATABASE_URL
//!
//! Run with: cargo test -p integration-tests --test api_tests

use chrono::{Duration, Utc};
use integration_tests::{
    assert_json, assert_status, assert_text, check_test_env, fixtures::*, TestServer,
};
use reqwest::{Method, StatusCode};
use serde_json::json;

/// Register users `ids` and create segments `names`
async fn seed(server: &TestServer, ids: &[i64], names: &[&str]) {
    if !ids.is_empty() {
        let users: Vec<UserRef> = ids.iter().map(|&id| UserRef { id }).collect();
        let response = server.post("/users", &users).await.unwrap();
        assert_status(response, StatusCode::OK).await.unwrap();
    }
    for name in names {
        let response = server.post("/segments", &SegmentRef::new(*name)).await.unwrap();
        assert_status(response, StatusCode::OK).await.unwrap();
    }
}

async fn segments_of(server: &TestServer, id: i64) -> Vec<String> {
    let response = server.get_json("/users/segments", &UserRef { id }).await.unwrap();
    let segments: Vec<SegmentRef> = assert_json(response, StatusCode::OK).await.unwrap();
    names_of(&segments)
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Segment Tests
// ============================================================================

#[tokio::test]
async fn test_create_segment() {
    let server = TestServer::start().await.unwrap();

    let response = server.post("/segments", &SegmentRef::new("VIP")).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_segment_names_are_case_insensitive() {
    let server = TestServer::start().await.unwrap();
    seed(&server, &[], &["abc"]).await;

    let response = server.post("/segments", &SegmentRef::new("ABC")).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_percent_assignment() {
    let server = TestServer::start().await.unwrap();
    seed(&server, &[1, 2, 3, 4], &["VIP"]).await;

    let response = server
        .post("/segments?percent=50", &SegmentRef::new("PREMIUM"))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let mut premium = 0;
    for id in 1..=4 {
        if segments_of(&server, id).await.contains(&"PREMIUM".to_string()) {
            premium += 1;
        }
    }
    assert_eq!(premium, 2);
}

#[tokio::test]
async fn test_percent_too_small_keeps_segment() {
    let server = TestServer::start().await.unwrap();
    seed(&server, &[1, 2, 3, 4], &[]).await;

    let response = server
        .post("/segments?percent=10", &SegmentRef::new("TINY"))
        .await
        .unwrap();
    let body = assert_text(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body, "not enough users for that percent");

    // The segment exists and can be assigned
    let response = server
        .post("/users/segments", &UserSegments::new(1, &["tiny"]))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_percent_out_of_range() {
    let server = TestServer::start().await.unwrap();
    seed(&server, &[1, 2], &[]).await;

    let response = server
        .post("/segments?percent=101", &SegmentRef::new("OVER"))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    // Nothing was created, so the name is still free
    let response = server.post("/segments", &SegmentRef::new("OVER")).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_delete_segment_drops_memberships() {
    let server = TestServer::start().await.unwrap();
    seed(&server, &[], &["VIP"]).await;

    let response = server
        .post("/users/segments", &UserSegments::new(5, &["VIP"]))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.delete("/segments", &SegmentRef::new("vip")).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    assert!(segments_of(&server, 5).await.is_empty());
    assert_eq!(server.store.as_ref().unwrap().membership_count(), 0);
}

#[tokio::test]
async fn test_empty_segment_name() {
    let server = TestServer::start().await.unwrap();

    let response = server.post("/segments", &json!({})).await.unwrap();
    let body = assert_text(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body, "there is no segment");
}

// ============================================================================
// User Segment Tests
// ============================================================================

#[tokio::test]
async fn test_assign_and_query() {
    let server = TestServer::start().await.unwrap();
    seed(&server, &[], &["A", "B", "C"]).await;

    let response = server
        .post("/users/segments", &UserSegments::new(10, &["a", "B"]))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    assert_eq!(segments_of(&server, 10).await, vec!["A", "B"]);
}

#[tokio::test]
async fn test_unknown_segment_rejects_whole_request() {
    let server = TestServer::start().await.unwrap();
    seed(&server, &[], &["VIP"]).await;

    let response = server
        .post("/users/segments", &UserSegments::new(7, &["VIP", "UNKNOWN"]))
        .await
        .unwrap();
    let body = assert_text(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body, "there is no such segment UNKNOWN");

    assert!(segments_of(&server, 7).await.is_empty());
}

#[tokio::test]
async fn test_remove_skips_unknown() {
    let server = TestServer::start().await.unwrap();
    seed(&server, &[], &["VIP", "BETA"]).await;

    let response = server
        .post("/users/segments", &UserSegments::new(7, &["VIP", "BETA"]))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .delete("/users/segments", &UserSegments::new(7, &["UNKNOWN", "VIP"]))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    assert_eq!(segments_of(&server, 7).await, vec!["BETA"]);
}

#[tokio::test]
async fn test_expired_assignment_is_not_listed() {
    let server = TestServer::start().await.unwrap();
    seed(&server, &[], &["TRIAL", "VIP"]).await;

    let past = UserSegments::new(3, &["TRIAL"]).until(Utc::now() - Duration::minutes(1));
    assert_status(server.post("/users/segments", &past).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();

    let future = UserSegments::new(3, &["VIP"]).until(Utc::now() + Duration::days(30));
    assert_status(server.post("/users/segments", &future).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();

    assert_eq!(segments_of(&server, 3).await, vec!["VIP"]);
}

#[tokio::test]
async fn test_zero_date_end_means_no_end() {
    let server = TestServer::start().await.unwrap();
    seed(&server, &[], &["VIP"]).await;

    let body = json!({"id": 4, "segments": [{"name": "VIP"}], "date_end": "0001-01-01T00:00:00Z"});
    assert_status(server.post("/users/segments", &body).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();

    assert_eq!(segments_of(&server, 4).await, vec!["VIP"]);
}

#[tokio::test]
async fn test_remove_for_unknown_user() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .delete("/users/segments", &UserSegments::new(99, &["VIP"]))
        .await
        .unwrap();
    let body = assert_text(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body, "there is no such user 99");
}

#[tokio::test]
async fn test_missing_segments_list() {
    let server = TestServer::start().await.unwrap();

    let response = server.post("/users/segments", &json!({"id": 1})).await.unwrap();
    let body = assert_text(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body, "bad request");
}

#[tokio::test]
async fn test_duplicate_user_registration() {
    let server = TestServer::start().await.unwrap();
    seed(&server, &[1], &[]).await;

    let response = server.post("/users", &vec![UserRef { id: 1 }]).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_unsupported_method() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .send(Method::PATCH, "/users/segments", &UserRef { id: 1 })
        .await
        .unwrap();
    assert_status(response, StatusCode::METHOD_NOT_ALLOWED).await.unwrap();
}

// ============================================================================
// PostgreSQL-backed Tests
// ============================================================================

#[tokio::test]
async fn postgres_assign_query_remove() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_postgres().await.expect("Failed to start server");
    let user = UserRef::unique();
    let vip = SegmentRef::unique();
    let beta = SegmentRef::unique();

    for segment in [&vip, &beta] {
        assert_status(server.post("/segments", segment).await.unwrap(), StatusCode::OK)
            .await
            .unwrap();
    }

    let assign = UserSegments::new(user.id, &[vip.name.as_str(), beta.name.as_str()]);
    assert_status(server.post("/users/segments", &assign).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(segments_of(&server, user.id).await, names_of(&[vip.clone(), beta.clone()]));

    let remove = UserSegments::new(user.id, &["NO_SUCH_SEGMENT_EVER", vip.name.as_str()]);
    assert_status(server.delete("/users/segments", &remove).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(segments_of(&server, user.id).await, vec![beta.name.clone()]);

    assert_status(server.delete("/segments", &beta).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(segments_of(&server, user.id).await.is_empty());
}

#[tokio::test]
async fn postgres_unknown_segment_commits_nothing() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_postgres().await.expect("Failed to start server");
    let user = UserRef::unique();
    let known = SegmentRef::unique();
    assert_status(server.post("/segments", &known).await.unwrap(), StatusCode::OK)
        .await
        .unwrap();

    let assign = UserSegments::new(user.id, &[known.name.as_str(), "NO_SUCH_SEGMENT_EVER"]);
    assert_status(server.post("/users/segments", &assign).await.unwrap(), StatusCode::BAD_REQUEST)
        .await
        .unwrap();

    assert!(segments_of(&server, user.id).await.is_empty());
}

#[tokio::test]
async fn postgres_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start_postgres().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}
