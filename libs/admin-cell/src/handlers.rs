use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::services::approval::ApprovalService;

#[derive(Debug, Deserialize)]
pub struct RejectDoctorRequest {
    pub reason: Option<String>,
}

#[axum::debug_handler]
pub async fn get_pending_doctors(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = ApprovalService::new(&state);
    let doctors = service.pending_doctors().await?;

    Ok(Json(json!({
        "success": true,
        "doctors": doctors
    })))
}

#[axum::debug_handler]
pub async fn get_all_doctors(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = ApprovalService::new(&state);
    let doctors = service.all_doctors().await?;

    Ok(Json(json!({
        "success": true,
        "doctors": doctors
    })))
}

#[axum::debug_handler]
pub async fn approve_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ApprovalService::new(&state);
    let doctor = service.approve(doctor_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Doctor approved successfully",
        "doctor": doctor
    })))
}

#[axum::debug_handler]
pub async fn reject_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<RejectDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ApprovalService::new(&state);
    let doctor = service.reject(doctor_id, request.reason).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Doctor rejected successfully",
        "doctor": doctor
    })))
}
