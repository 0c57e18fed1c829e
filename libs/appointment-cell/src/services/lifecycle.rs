use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_utils::email::EmailService;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, CancelAppointmentRequest,
    UpdateStatusRequest,
};

/// Status transitions and cancellation. Emails to the patient are
/// best-effort: a delivery failure never rolls back the transition.
pub struct LifecycleService {
    store: Arc<StoreClient>,
    email: EmailService,
}

impl LifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(StoreClient::new(config)),
            email: EmailService::new(config),
        }
    }

    pub fn with_store(store: Arc<StoreClient>, email: EmailService) -> Self {
        Self { store, email }
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let rows: Vec<Appointment> = self
            .store
            .select(
                "appointments",
                &[format!("id=eq.{}", appointment_id)],
                None,
                Some(1),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        request: UpdateStatusRequest,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get(appointment_id).await?;

        let mut patch = Map::new();
        patch.insert("status".to_string(), json!(request.status));
        if let Some(notes) = &request.notes {
            patch.insert("notes".to_string(), json!(notes.trim()));
        }
        if let Some(prescription) = &request.prescription {
            patch.insert("prescription".to_string(), json!(prescription.trim()));
        }
        if let Some(diagnosis) = &request.diagnosis {
            patch.insert("diagnosis".to_string(), json!(diagnosis.trim()));
        }
        patch.insert("updated_at".to_string(), json!(Utc::now()));

        let updated = self.apply_patch(appointment_id, patch).await?;

        info!(
            "Appointment {} moved from {} to {}",
            appointment_id, appointment.status, updated.status
        );

        if let Some(status_line) = status_email_line(updated.status) {
            self.notify_patient(&updated, status_line).await;
        }

        Ok(updated)
    }

    /// Cancels unless the appointment is already terminal. The stated
    /// reason is appended to the notes field rather than kept separately.
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get(appointment_id).await?;

        match appointment.status {
            AppointmentStatus::Cancelled => {
                return Err(AppointmentError::Validation(
                    "This appointment is already cancelled".to_string(),
                ))
            }
            AppointmentStatus::Completed => {
                return Err(AppointmentError::Validation(
                    "A completed appointment cannot be cancelled".to_string(),
                ))
            }
            _ => {}
        }

        let mut patch = Map::new();
        patch.insert("status".to_string(), json!(AppointmentStatus::Cancelled));
        if let Some(reason) = request.reason.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            let notes = if appointment.notes.is_empty() {
                format!("Cancellation reason: {}", reason)
            } else {
                format!("{}\nCancellation reason: {}", appointment.notes, reason)
            };
            patch.insert("notes".to_string(), json!(notes));
        }
        patch.insert("updated_at".to_string(), json!(Utc::now()));

        let updated = self.apply_patch(appointment_id, patch).await?;

        info!("Appointment {} cancelled", appointment_id);
        self.notify_patient(&updated, "has been cancelled").await;

        Ok(updated)
    }

    async fn apply_patch(
        &self,
        appointment_id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<Appointment, AppointmentError> {
        let updated: Vec<Appointment> = self
            .store
            .update(
                "appointments",
                &[format!("id=eq.{}", appointment_id)],
                Value::Object(patch),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        updated.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    async fn notify_patient(&self, appointment: &Appointment, status_line: &str) {
        if !self.email.is_configured() {
            return;
        }
        let date = appointment.appointment_date.format("%Y-%m-%d").to_string();
        if let Err(e) = self
            .email
            .send_appointment_status_email(
                &appointment.patient_email,
                &appointment.patient_name,
                &appointment.doctor_name,
                &date,
                &appointment.appointment_time,
                status_line,
            )
            .await
        {
            error!(
                "Failed to send status email for appointment {}: {}",
                appointment.id, e
            );
        }
    }
}

/// Patient-facing phrasing per status. Statuses without a line send no
/// email.
fn status_email_line(status: AppointmentStatus) -> Option<&'static str> {
    match status {
        AppointmentStatus::Approved => Some("has been approved"),
        AppointmentStatus::Rejected => Some("has been declined"),
        AppointmentStatus::Confirmed => Some("is confirmed"),
        AppointmentStatus::Cancelled => Some("has been cancelled"),
        _ => None,
    }
}
