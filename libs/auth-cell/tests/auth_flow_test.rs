use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHasher};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::router::auth_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

fn test_config(mock_server: &MockServer) -> AppConfig {
    let mut config = TestConfig::with_store_url(&mock_server.uri()).to_app_config();
    config.email_api_url = format!("{}/emails", mock_server.uri());
    config.email_api_key = "test-email-key".to_string();
    config
}

fn test_app(config: AppConfig) -> Router {
    auth_routes(Arc::new(config))
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn hash_for(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

async fn mount_no_existing_accounts(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn patient_signup_registers_and_sends_otp() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4().to_string();

    mount_no_existing_accounts(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::user_row(&user_id, "new.patient@example.com")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "msg_1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = post(
        test_app(test_config(&mock_server)),
        "/register",
        json!({
            "name": "New Patient",
            "email": "new.patient@example.com",
            "password": "secret123"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["role"], json!("patient"));
}

#[tokio::test]
async fn signup_with_taken_email_is_rejected() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::user_row(&user_id, "taken@example.com")
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let (status, _) = post(
        test_app(test_config(&mock_server)),
        "/register",
        json!({
            "name": "Someone Else",
            "email": "taken@example.com",
            "password": "secret123"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn signup_rolls_back_when_otp_delivery_fails() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4().to_string();

    mount_no_existing_accounts(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::user_row(&user_id, "new.patient@example.com")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(500).set_body_string("downstream failure"))
        .mount(&mock_server)
        .await;

    // Registration is deleted so the email can be reused.
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user_id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, _) = post(
        test_app(test_config(&mock_server)),
        "/register",
        json!({
            "name": "New Patient",
            "email": "new.patient@example.com",
            "password": "secret123"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn doctor_signup_requires_professional_details() {
    let mock_server = MockServer::start().await;

    let (status, body) = post(
        test_app(test_config(&mock_server)),
        "/register",
        json!({
            "name": "Dr. Incomplete",
            "email": "dr.incomplete@example.com",
            "password": "secret123",
            "role": "doctor"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("specialization"));
}

#[tokio::test]
async fn otp_verification_marks_the_account_verified() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4().to_string();

    let mut row = MockStoreResponses::user_row(&user_id, "new.patient@example.com");
    row["is_email_verified"] = json!(false);
    row["otp_code"] = json!("123456");
    row["otp_expires_at"] = json!((Utc::now() + Duration::minutes(5)).to_rfc3339());

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row.clone()])))
        .mount(&mock_server)
        .await;

    let mut verified = row.clone();
    verified["is_email_verified"] = json!(true);
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([verified])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = post(
        test_app(test_config(&mock_server)),
        "/verify-otp",
        json!({
            "email": "new.patient@example.com",
            "otp": "123456"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn otp_verification_rejects_a_wrong_code() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4().to_string();

    let mut row = MockStoreResponses::user_row(&user_id, "new.patient@example.com");
    row["is_email_verified"] = json!(false);
    row["otp_code"] = json!("123456");
    row["otp_expires_at"] = json!((Utc::now() + Duration::minutes(5)).to_rfc3339());

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let (status, body) = post(
        test_app(test_config(&mock_server)),
        "/verify-otp",
        json!({
            "email": "new.patient@example.com",
            "otp": "999999"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Invalid OTP. Please try again."));
}

#[tokio::test]
async fn verified_patient_can_login() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4().to_string();

    let mut row = MockStoreResponses::user_row(&user_id, "patient@example.com");
    row["password_hash"] = json!(hash_for("secret123"));

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let (status, body) = post(
        test_app(test_config(&mock_server)),
        "/login",
        json!({
            "email": "patient@example.com",
            "password": "secret123"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);
    assert_eq!(body["user"]["role"], json!("patient"));
}

#[tokio::test]
async fn login_rejects_a_wrong_password() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4().to_string();

    let mut row = MockStoreResponses::user_row(&user_id, "patient@example.com");
    row["password_hash"] = json!(hash_for("secret123"));

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let (status, _) = post(
        test_app(test_config(&mock_server)),
        "/login",
        json!({
            "email": "patient@example.com",
            "password": "wrong-password"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unverified_account_cannot_login() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4().to_string();

    let mut row = MockStoreResponses::user_row(&user_id, "patient@example.com");
    row["is_email_verified"] = json!(false);
    row["password_hash"] = json!(hash_for("secret123"));

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let (status, _) = post(
        test_app(test_config(&mock_server)),
        "/login",
        json!({
            "email": "patient@example.com",
            "password": "secret123"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn pending_doctor_cannot_login() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();

    let mut row = MockStoreResponses::doctor_row(&doctor_id, "Cardiologist");
    row["status"] = json!("pending");
    row["password_hash"] = json!(hash_for("secret123"));

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let (status, _) = post(
        test_app(test_config(&mock_server)),
        "/login",
        json!({
            "email": "sarah.johnson@hospital.example",
            "password": "secret123",
            "role": "doctor"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_logs_in_with_configured_credentials() {
    let mock_server = MockServer::start().await;

    let (status, body) = post(
        test_app(test_config(&mock_server)),
        "/login",
        json!({
            "email": "admin@helthbot.example",
            "password": "admin-test-password",
            "role": "admin"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], json!("admin"));
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn logout_always_succeeds() {
    let mock_server = MockServer::start().await;

    let (status, body) = post(test_app(test_config(&mock_server)), "/logout", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}
