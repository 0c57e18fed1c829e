use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::{auth_middleware, require_admin};

use crate::handlers;

pub fn admin_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/doctors/pending", get(handlers::get_pending_doctors))
        .route("/doctors/all", get(handlers::get_all_doctors))
        .route("/doctors/{doctor_id}/approve", post(handlers::approve_doctor))
        .route("/doctors/{doctor_id}/reject", post(handlers::reject_doctor))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
