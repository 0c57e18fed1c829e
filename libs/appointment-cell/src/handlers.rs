use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, AppointmentStatus, BookAppointmentRequest, BookedAppointment,
    CancelAppointmentRequest, UpdateStatusRequest,
};
use crate::services::booking::BookingService;
use crate::services::lifecycle::LifecycleService;
use crate::services::query::{AppointmentFilter, QueryService};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl From<&ListQuery> for AppointmentFilter {
    fn from(q: &ListQuery) -> Self {
        AppointmentFilter {
            status: q.status,
            date: q.date,
            limit: q.limit,
            offset: q.offset,
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Validation(msg) => AppError::BadRequest(msg),
            AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            AppointmentError::SlotTaken => AppError::Conflict(err.to_string()),
            AppointmentError::Database(msg) => AppError::Database(msg),
        }
    }
}

fn require_doctor_or_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.role == Role::Doctor || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Doctor or admin access required".to_string(),
        ))
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking = BookingService::new(&state);
    let appointment = booking.book(request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment booked successfully",
        "appointment": BookedAppointment::from(&appointment)
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    require_doctor_or_admin(&user)?;

    let appointments = QueryService::new(&state)
        .for_doctor(doctor_id, &AppointmentFilter::from(&query))
        .await?;
    let count = appointments.len();

    Ok(Json(json!({
        "success": true,
        "appointments": appointments,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn get_pending_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_doctor_or_admin(&user)?;

    let appointments = QueryService::new(&state)
        .pending_for_doctor(doctor_id)
        .await?;
    let count = appointments.len();

    Ok(Json(json!({
        "success": true,
        "appointments": appointments,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Path(patient_email): Path<String>,
) -> Result<Json<Value>, AppError> {
    // Patients may only read their own history.
    let owns_history = user
        .email
        .as_deref()
        .map(|e| e.eq_ignore_ascii_case(patient_email.trim()))
        .unwrap_or(false);
    if !user.is_admin() && user.role != Role::Doctor && !owns_history {
        return Err(AppError::Forbidden(
            "You can only view your own appointments".to_string(),
        ));
    }

    let appointments = QueryService::new(&state).for_patient(&patient_email).await?;
    let count = appointments.len();

    Ok(Json(json!({
        "success": true,
        "appointments": appointments,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = QueryService::new(&state).get(appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_stats(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_doctor_or_admin(&user)?;

    let stats = QueryService::new(&state).stats(doctor_id).await?;

    Ok(Json(json!({
        "success": true,
        "stats": stats
    })))
}

#[axum::debug_handler]
pub async fn get_all_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = QueryService::new(&state)
        .all(&AppointmentFilter::from(&query))
        .await?;
    let count = appointments.len();

    Ok(Json(json!({
        "success": true,
        "appointments": appointments,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    require_doctor_or_admin(&user)?;

    let appointment = LifecycleService::new(&state)
        .update_status(appointment_id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment status updated",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = LifecycleService::new(&state)
        .cancel(appointment_id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled",
        "appointment": appointment
    })))
}
