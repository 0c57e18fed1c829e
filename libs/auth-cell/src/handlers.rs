use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{AuthError, LoginRequest, ResendOtpRequest, SignupRequest, VerifyOtpRequest};
use crate::services::account::AccountService;

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => AppError::ValidationError(msg),
            AuthError::AlreadyRegistered => AppError::Conflict(err.to_string()),
            AuthError::NotFound => AppError::NotFound(err.to_string()),
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::EmailNotVerified => AppError::Auth(err.to_string()),
            AuthError::PendingApproval => AppError::Forbidden(err.to_string()),
            AuthError::EmailDelivery => AppError::ExternalService(err.to_string()),
            AuthError::Database(msg) => AppError::Database(msg),
        }
    }
}

#[axum::debug_handler]
pub async fn signup(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Signup request for role {}", request.role);

    let service = AccountService::new(&state);
    let (email, role) = service.signup(request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Registration successful. Please check your email for verification code.",
        "email": email,
        "role": role
    })))
}

#[axum::debug_handler]
pub async fn verify_otp(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AccountService::new(&state);

    let email = request.email.clone();
    let role = request.role;
    service.verify_otp(request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Email verified successfully. You can now login.",
        "email": email,
        "role": role
    })))
}

#[axum::debug_handler]
pub async fn resend_otp(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<ResendOtpRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AccountService::new(&state);
    service.resend_otp(request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "New verification code sent to your email."
    })))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AccountService::new(&state);
    let response = service.login(request).await?;

    Ok(Json(json!(response)))
}

/// Sessions are stateless JWTs; logout is acknowledged so clients can
/// clear their stored token.
#[axum::debug_handler]
pub async fn logout() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Logout successful."
    }))
}
