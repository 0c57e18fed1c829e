use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockStoreResponses, TestConfig, TestUser};
use triage_cell::router::triage_routes;

fn test_app(config: AppConfig) -> Router {
    triage_routes(Arc::new(config))
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

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn symptom_listing_returns_the_dataset() {
    let config = TestConfig::default().to_app_config();
    let (status, body) = send(test_app(config), get("/symptoms")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["count"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn symptom_search_finds_exact_matches() {
    let config = TestConfig::default().to_app_config();
    let (status, body) = send(test_app(config), get("/symptoms/search?query=fever")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_spelling_suggestions"], json!(false));
    assert!(!body["matches"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn symptom_search_corrects_misspellings() {
    let config = TestConfig::default().to_app_config();
    let (status, body) = send(test_app(config), get("/symptoms/search?query=fevr")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_spelling_suggestions"], json!(true));
    assert!(body["spell_suggestions"]
        .as_array()
        .unwrap()
        .contains(&json!("fever")));
}

#[tokio::test]
async fn symptom_suggestions_short_circuit_on_containment() {
    let config = TestConfig::default().to_app_config();
    let (status, body) = send(test_app(config), get("/symptoms/suggestions?query=fev")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_exact_match"], json!(true));
    assert!(body["exact_matches"]
        .as_array()
        .unwrap()
        .contains(&json!("fever")));
}

#[tokio::test]
async fn symptom_advice_lookup_finds_treatment() {
    let config = TestConfig::default().to_app_config();
    let (status, body) = send(test_app(config), get("/symptoms/advice/fever")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["symptom"]["treatment"].as_str().unwrap().len() > 0);
}

#[tokio::test]
async fn unknown_symptom_advice_returns_not_found() {
    let config = TestConfig::default().to_app_config();
    let (status, body) = send(test_app(config), get("/symptoms/advice/flux-capacitor")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Symptom not found"));
}

#[tokio::test]
async fn chat_requires_authentication() {
    let config = TestConfig::default().to_app_config();
    let (status, _) = send(
        test_app(config),
        post_json("/chat", None, json!({"message": "I have a fever"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn chat_classifies_complex_symptoms_and_recommends_doctors() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_row(&doctor_id, "Oncologist")
        ])))
        .mount(&mock_server)
        .await;

    let test_config = TestConfig::with_store_url(&mock_server.uri());
    let token = JwtTestUtils::create_test_token(
        &TestUser::patient("patient@example.com"),
        &test_config.jwt_secret,
    );

    let (status, body) = send(
        test_app(test_config.to_app_config()),
        post_json(
            "/chat",
            Some(&token),
            json!({"message": "I have a headache and cancer"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["complexity"], json!("complex"));
    assert_eq!(body["should_see_doctor"], json!(true));
    assert_eq!(body["specialization"], json!("Oncologist"));
    assert_eq!(body["doctors"].as_array().unwrap().len(), 1);
    assert!(body["message"].as_str().unwrap().contains("Oncologist"));
}

#[tokio::test]
async fn chat_handles_basic_symptoms_without_doctor_lookup() {
    let test_config = TestConfig::default();
    let token = JwtTestUtils::create_test_token(
        &TestUser::patient("patient@example.com"),
        &test_config.jwt_secret,
    );

    let (status, body) = send(
        test_app(test_config.to_app_config()),
        post_json(
            "/chat",
            Some(&token),
            json!({"message": "I have a mild headache"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["complexity"], json!("basic"));
    assert_eq!(body["should_see_doctor"], json!(false));
    assert!(body["doctors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn chat_rejects_an_empty_message() {
    let test_config = TestConfig::default();
    let token = JwtTestUtils::create_test_token(
        &TestUser::patient("patient@example.com"),
        &test_config.jwt_secret,
    );

    let (status, body) = send(
        test_app(test_config.to_app_config()),
        post_json("/chat", Some(&token), json!({"message": "   "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Message is required"));
}

#[tokio::test]
async fn generated_advice_comes_from_the_ai_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "Assessment: likely viral. Self-care: rest and fluids."}]
                }
            }]
        })))
        .mount(&mock_server)
        .await;

    let mut config = TestConfig::default().to_app_config();
    config.gemini_api_key = "test-key".to_string();
    config.gemini_base_url = mock_server.uri();

    let (status, body) = send(
        test_app(config),
        post_json(
            "/symptoms/gemini/advice",
            None,
            json!({"symptom_query": "persistent dry cough"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["message"].as_str().unwrap().contains("Assessment"));
}

#[tokio::test]
async fn non_medical_advice_queries_are_fenced_off() {
    let config = TestConfig::default().to_app_config();

    let (status, body) = send(
        test_app(config),
        post_json(
            "/symptoms/gemini/advice",
            None,
            json!({"symptom_query": "what is the capital of France"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("outside my medical scope"));
}

#[tokio::test]
async fn advice_without_configuration_reports_bad_gateway() {
    let config = TestConfig::default().to_app_config();

    let (status, _) = send(
        test_app(config),
        post_json(
            "/symptoms/gemini/advice",
            None,
            json!({"symptom_query": "persistent dry cough"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
