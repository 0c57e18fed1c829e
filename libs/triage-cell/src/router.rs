use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn triage_routes(state: Arc<AppConfig>) -> Router {
    let public = Router::new()
        .route("/symptoms", get(handlers::list_symptoms))
        .route("/symptoms/search", get(handlers::search_symptoms))
        .route("/symptoms/suggestions", get(handlers::symptom_suggestions))
        .route("/symptoms/advice/{symptom}", get(handlers::symptom_advice))
        .route("/symptoms/gemini/advice", post(handlers::generate_advice))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/prescription", post(handlers::generate_prescription))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    public.merge(protected)
}
