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

use appointment_cell::router::appointment_routes;
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

fn test_app(mock_server: &MockServer) -> Router {
    let config = TestConfig::with_store_url(&mock_server.uri());
    appointment_routes(config.to_arc())
}

fn booking_body(doctor_id: &str) -> Value {
    json!({
        "patient_name": "Asha Rao",
        "patient_email": "asha@example.com",
        "patient_phone": "9876543210",
        "patient_age": 31,
        "patient_gender": "Female",
        "doctor_id": doctor_id,
        "appointment_date": "2026-09-14",
        "appointment_time": "10:00 AM",
        "reason": "Recurring headaches"
    })
}

async fn post_booking(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/book")
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

async fn mount_doctor_lookup(mock_server: &MockServer, doctor_id: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_row(doctor_id, "Neurologist")
        ])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn booking_a_free_slot_succeeds() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();
    let appointment_id = Uuid::new_v4().to_string();

    mount_doctor_lookup(&mock_server, &doctor_id).await;

    // No existing appointments for the conflict check.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::appointment_row(&appointment_id, &doctor_id, "10:00 AM", "pending")
        ])))
        .mount(&mock_server)
        .await;

    let (status, body) = post_booking(test_app(&mock_server), booking_body(&doctor_id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["appointment"]["status"], json!("pending"));
}

#[tokio::test]
async fn booking_a_taken_slot_returns_conflict() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();
    let existing_id = Uuid::new_v4().to_string();

    mount_doctor_lookup(&mock_server, &doctor_id).await;

    // Same doctor, same day, same slot label, still pending.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::appointment_row(&existing_id, &doctor_id, "10:00 AM", "pending")
        ])))
        .mount(&mock_server)
        .await;

    let (status, body) = post_booking(test_app(&mock_server), booking_body(&doctor_id)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        json!("This time slot is already booked. Please choose another time.")
    );
}

#[tokio::test]
async fn booking_a_different_slot_with_the_same_doctor_succeeds() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();
    let appointment_id = Uuid::new_v4().to_string();

    mount_doctor_lookup(&mock_server, &doctor_id).await;

    // Conflict query carries the requested slot, so a booking at another
    // label sees no rows.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("appointment_time", "eq.11:00 AM"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::appointment_row(&appointment_id, &doctor_id, "11:00 AM", "pending")
        ])))
        .mount(&mock_server)
        .await;

    let mut body = booking_body(&doctor_id);
    body["appointment_time"] = json!("11:00 AM");
    let (status, response) = post_booking(test_app(&mock_server), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["success"], json!(true));
}

#[tokio::test]
async fn booking_with_an_unknown_doctor_returns_not_found() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let (status, body) = post_booking(test_app(&mock_server), booking_body(&doctor_id)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Doctor not found"));
}

#[tokio::test]
async fn booking_with_an_invalid_email_is_rejected_before_any_lookup() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();

    let mut body = booking_body(&doctor_id);
    body["patient_email"] = json!("not-an-email");
    let (status, response) = post_booking(test_app(&mock_server), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response["error"],
        json!("Please provide a valid email address")
    );
}
