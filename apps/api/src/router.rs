use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use admin_cell::router::admin_routes;
use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use doctor_cell::router::doctor_routes;
use shared_config::AppConfig;
use triage_cell::router::triage_routes;

async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Server is running",
        "timestamp": chrono::Utc::now()
    }))
}

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/admin", admin_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .merge(triage_routes(state));

    Router::new()
        .route("/", get(|| async { "HelthBot API is running!" }))
        .nest("/api", api)
}
