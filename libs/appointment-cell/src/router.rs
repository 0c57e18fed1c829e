use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::{auth_middleware, require_admin};

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // Booking stays open so patients can book before creating an account.
    let public = Router::new()
        .route("/book", post(handlers::book_appointment))
        .with_state(state.clone());

    let admin = Router::new()
        .route("/admin/all", get(handlers::get_all_appointments))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/doctor/{doctor_id}", get(handlers::get_doctor_appointments))
        .route(
            "/doctor/{doctor_id}/pending",
            get(handlers::get_pending_doctor_appointments),
        )
        .route(
            "/patient/{patient_email}",
            get(handlers::get_patient_appointments),
        )
        .route("/stats/{doctor_id}", get(handlers::get_doctor_stats))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route(
            "/{appointment_id}/status",
            put(handlers::update_appointment_status),
        )
        .route(
            "/{appointment_id}/cancel",
            put(handlers::cancel_appointment),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    public.merge(admin).merge(protected)
}
