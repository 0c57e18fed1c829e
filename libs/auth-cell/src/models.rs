use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::auth::Role;

/// Patient account row. Doctors live in their own table; see the
/// doctor-cell models.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_email_verified: bool,
    pub otp_code: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_role() -> Role {
    Role::Patient
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,

    // Doctor-only fields
    pub specialization: Option<String>,
    pub experience: Option<String>,
    pub hospital: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResendOtpRequest {
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: AccountSummary,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_email_verified: bool,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("User already registered with this email.")]
    AlreadyRegistered,

    #[error("User not found.")]
    NotFound,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Please verify your email before logging in.")]
    EmailNotVerified,

    #[error("Your account is pending admin approval")]
    PendingApproval,

    #[error("Failed to send verification email. Please try again.")]
    EmailDelivery,

    #[error("Database error: {0}")]
    Database(String),
}
