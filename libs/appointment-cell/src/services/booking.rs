use regex::Regex;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use doctor_cell::models::DoctorStatus;
use doctor_cell::services::directory::DirectoryService;
use shared_config::AppConfig;
use shared_database::store::StoreClient;

use crate::models::{Appointment, AppointmentError, BookAppointmentRequest};
use crate::services::conflict::ConflictCheckService;

fn is_valid_email(email: &str) -> bool {
    let re = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    re.is_match(email)
}

pub struct BookingService {
    store: Arc<StoreClient>,
    directory: DirectoryService,
    conflicts: ConflictCheckService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        let store = Arc::new(StoreClient::new(config));
        Self::with_store(store)
    }

    pub fn with_store(store: Arc<StoreClient>) -> Self {
        Self {
            directory: DirectoryService::with_store(store.clone()),
            conflicts: ConflictCheckService::new(store.clone()),
            store,
        }
    }

    fn validate(request: &BookAppointmentRequest) -> Result<(), AppointmentError> {
        if request.patient_name.trim().is_empty() {
            return Err(AppointmentError::Validation(
                "Patient name is required".to_string(),
            ));
        }
        if !is_valid_email(&request.patient_email) {
            return Err(AppointmentError::Validation(
                "Please provide a valid email address".to_string(),
            ));
        }
        let phone = request.patient_phone.trim();
        if !phone.chars().all(|c| c.is_ascii_digit()) || phone.len() != 10 {
            return Err(AppointmentError::Validation(
                "Phone must be 10 digits".to_string(),
            ));
        }
        if request.patient_age < 0 || request.patient_age > 150 {
            return Err(AppointmentError::Validation(
                "Please provide a valid age".to_string(),
            ));
        }
        if request.appointment_time.trim().is_empty() {
            return Err(AppointmentError::Validation(
                "Appointment time is required".to_string(),
            ));
        }
        if request.reason.trim().is_empty() {
            return Err(AppointmentError::Validation(
                "Reason for the visit is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Books a slot with the doctor after the conflict check passes.
    /// Doctor contact details are copied onto the record so reads stay
    /// join-free even if the doctor profile changes later.
    pub async fn book(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        Self::validate(&request)?;

        let doctor = match self.directory.get(request.doctor_id).await {
            Ok(doctor) => doctor,
            Err(doctor_cell::models::DoctorError::NotFound) => {
                return Err(AppointmentError::DoctorNotFound)
            }
            Err(e) => return Err(AppointmentError::Database(e.to_string())),
        };

        if !doctor.is_email_verified || doctor.status != DoctorStatus::Approved {
            return Err(AppointmentError::Validation(
                "This doctor is not currently accepting appointments".to_string(),
            ));
        }

        let time_slot = request.appointment_time.trim().to_string();
        if self
            .conflicts
            .has_conflict(doctor.id, request.appointment_date, &time_slot)
            .await?
        {
            warn!(
                "Rejected double booking for doctor {} on {} at {:?}",
                doctor.id, request.appointment_date, time_slot
            );
            return Err(AppointmentError::SlotTaken);
        }

        let appointment_date = request
            .appointment_date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppointmentError::Validation("Invalid appointment date".to_string()))?
            .and_utc();

        let appointment: Appointment = self
            .store
            .insert(
                "appointments",
                json!({
                    "patient_id": request.patient_id,
                    "patient_name": request.patient_name.trim(),
                    "patient_email": request.patient_email.trim().to_lowercase(),
                    "patient_phone": request.patient_phone.trim(),
                    "patient_age": request.patient_age,
                    "patient_gender": request.patient_gender,
                    "doctor_id": doctor.id,
                    "doctor_name": doctor.name,
                    "doctor_email": doctor.email,
                    "doctor_specialization": doctor.specialization,
                    "doctor_hospital": doctor.hospital,
                    "appointment_date": appointment_date,
                    "appointment_time": time_slot,
                    "reason": request.reason.trim(),
                    "symptoms": request.symptoms.as_deref().unwrap_or("").trim(),
                    "notes": request.notes.as_deref().unwrap_or("").trim(),
                    "status": "pending",
                    "is_urgent": request.is_urgent.unwrap_or(false),
                    "prescription": "",
                    "diagnosis": "",
                }),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        info!(
            "Booked appointment {} for {} with Dr. {} on {} at {}",
            appointment.id,
            appointment.patient_email,
            appointment.doctor_name,
            request.appointment_date,
            appointment.appointment_time
        );

        Ok(appointment)
    }
}
