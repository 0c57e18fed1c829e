use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Stored appointment record. Doctor fields are denormalized at booking
/// time so listings do not need a join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Option<Uuid>,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub patient_age: i32,
    pub patient_gender: Gender,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub doctor_email: String,
    pub doctor_specialization: String,
    pub doctor_hospital: String,
    pub appointment_date: DateTime<Utc>,
    pub appointment_time: String,
    pub reason: String,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub notes: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(default)]
    pub prescription: String,
    #[serde(default)]
    pub diagnosis: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
    Confirmed,
    Cancelled,
    Completed,
    Rescheduled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Approved => write!(f, "approved"),
            AppointmentStatus::Rejected => write!(f, "rejected"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Rescheduled => write!(f, "rescheduled"),
        }
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "approved" => Ok(AppointmentStatus::Approved),
            "rejected" => Ok(AppointmentStatus::Rejected),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            "rescheduled" => Ok(AppointmentStatus::Rescheduled),
            _ => Err(()),
        }
    }
}

impl AppointmentStatus {
    /// Statuses that hold a slot. Only these participate in conflict
    /// detection.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Option<Uuid>,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub patient_age: i32,
    pub patient_gender: Gender,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub reason: String,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    pub is_urgent: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub prescription: Option<String>,
    pub diagnosis: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
}

/// Subset returned from the booking endpoint.
#[derive(Debug, Serialize)]
pub struct BookedAppointment {
    pub id: Uuid,
    pub patient_name: String,
    pub doctor_name: String,
    pub appointment_date: DateTime<Utc>,
    pub appointment_time: String,
    pub status: AppointmentStatus,
}

impl From<&Appointment> for BookedAppointment {
    fn from(apt: &Appointment) -> Self {
        Self {
            id: apt.id,
            patient_name: apt.patient_name.clone(),
            doctor_name: apt.doctor_name.clone(),
            appointment_date: apt.appointment_date,
            appointment_time: apt.appointment_time.clone(),
            status: apt.status,
        }
    }
}

/// Dashboard counters for a doctor.
#[derive(Debug, Default, Serialize)]
pub struct AppointmentStats {
    pub total: usize,
    pub today: usize,
    pub confirmed_today: usize,
    pub completed: usize,
    pub pending: usize,
    pub upcoming: usize,
    pub by_status: StatusCounts,
}

#[derive(Debug, Default, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub confirmed: usize,
    pub cancelled: usize,
    pub completed: usize,
    pub rescheduled: usize,
}

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("{0}")]
    Validation(String),

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Appointment not found")]
    NotFound,

    #[error("This time slot is already booked. Please choose another time.")]
    SlotTaken,

    #[error("Database error: {0}")]
    Database(String),
}
