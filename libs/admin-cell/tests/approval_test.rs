use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use admin_cell::router::admin_routes;
use shared_utils::test_utils::{JwtTestUtils, MockStoreResponses, TestConfig, TestUser};

fn test_setup(mock_server: &MockServer) -> (Router, String, String) {
    let config = TestConfig::with_store_url(&mock_server.uri());
    let admin_token = JwtTestUtils::create_test_token(
        &TestUser::admin("admin@helthbot.example"),
        &config.jwt_secret,
    );
    let patient_token = JwtTestUtils::create_test_token(
        &TestUser::patient("patient@example.com"),
        &config.jwt_secret,
    );
    (admin_routes(config.to_arc()), admin_token, patient_token)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn post_with_token(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn pending_doctor_listing_requires_admin_role() {
    let mock_server = MockServer::start().await;
    let (app, _, patient_token) = test_setup(&mock_server);

    let (status, _) = send(app, get_with_token("/doctors/pending", &patient_token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn pending_doctor_listing_rejects_missing_token() {
    let mock_server = MockServer::start().await;
    let (app, _, _) = test_setup(&mock_server);

    let request = Request::builder()
        .uri("/doctors/pending")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_sees_pending_doctors() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();

    let mut row = MockStoreResponses::doctor_row(&doctor_id, "Cardiologist");
    row["status"] = json!("pending");

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("status", "eq.pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let (app, admin_token, _) = test_setup(&mock_server);
    let (status, body) = send(app, get_with_token("/doctors/pending", &admin_token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctors"][0]["status"], json!("pending"));
}

#[tokio::test]
async fn approving_a_doctor_updates_their_status() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();

    let approved = MockStoreResponses::doctor_row(&doctor_id, "Cardiologist");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([approved])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (app, admin_token, _) = test_setup(&mock_server);
    let (status, body) = send(
        app,
        post_with_token(
            &format!("/doctors/{}/approve", doctor_id),
            &admin_token,
            json!({}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctor"]["status"], json!("approved"));
}

#[tokio::test]
async fn rejecting_a_doctor_records_the_outcome() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();

    let mut rejected = MockStoreResponses::doctor_row(&doctor_id, "Cardiologist");
    rejected["status"] = json!("rejected");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([rejected])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (app, admin_token, _) = test_setup(&mock_server);
    let (status, body) = send(
        app,
        post_with_token(
            &format!("/doctors/{}/reject", doctor_id),
            &admin_token,
            json!({"reason": "Certificate could not be verified"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctor"]["status"], json!("rejected"));
}
