use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{DoctorError, UpdateDoctorRequest};
use crate::services::directory::DirectoryService;

#[derive(Debug, Deserialize)]
pub struct SpecializationQuery {
    pub specialization: String,
    pub limit: Option<usize>,
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::Validation(msg) => AppError::ValidationError(msg),
            DoctorError::Database(msg) => AppError::Database(msg),
        }
    }
}

#[axum::debug_handler]
pub async fn list_verified_doctors(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let directory = DirectoryService::new(&state);
    let doctors = directory.list_verified().await?;
    let count = doctors.len();

    Ok(Json(json!({
        "success": true,
        "doctors": doctors,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<SpecializationQuery>,
) -> Result<Json<Value>, AppError> {
    let directory = DirectoryService::new(&state);

    let limit = query.limit.unwrap_or(10);
    let doctors = directory
        .find_by_specialization(&query.specialization, limit)
        .await?;

    let profiles: Vec<crate::models::DoctorProfile> = doctors
        .into_iter()
        .map(crate::models::DoctorProfile::from)
        .collect();
    let count = profiles.len();

    Ok(Json(json!({
        "success": true,
        "doctors": profiles,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let directory = DirectoryService::new(&state);
    let doctor = directory.get_profile(doctor_id).await?;

    Ok(Json(json!({
        "success": true,
        "doctor": doctor
    })))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let directory = DirectoryService::new(&state);
    let doctor = directory.update(doctor_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "doctor": doctor
    })))
}
