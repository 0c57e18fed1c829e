use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Full doctor row as stored. Never serialized to clients directly;
/// see [`DoctorProfile`].
#[derive(Debug, Clone, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub specialization: String,
    pub experience: String,
    pub hospital: String,
    pub phone: String,
    pub location: String,
    pub is_email_verified: bool,
    pub status: DoctorStatus,
    pub otp_code: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Approval state driven by the admin review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoctorStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for DoctorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoctorStatus::Pending => write!(f, "pending"),
            DoctorStatus::Approved => write!(f, "approved"),
            DoctorStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Client-facing view of a doctor, with credentials and OTP stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub specialization: String,
    pub experience: String,
    pub hospital: String,
    pub phone: String,
    pub location: String,
    pub status: DoctorStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Doctor> for DoctorProfile {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            email: doctor.email,
            specialization: doctor.specialization,
            experience: doctor.experience,
            hospital: doctor.hospital,
            phone: doctor.phone,
            location: doctor.location,
            status: doctor.status,
            created_at: doctor.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<String>,
    pub hospital: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}
