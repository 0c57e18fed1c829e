use tracing::{error, info};
use uuid::Uuid;

use doctor_cell::models::{DoctorError, DoctorProfile, DoctorStatus};
use doctor_cell::services::directory::DirectoryService;
use shared_config::AppConfig;
use shared_utils::email::EmailService;

/// Admin review workflow over doctor registrations. Notification emails are
/// best-effort; a delivery failure never fails the review action.
pub struct ApprovalService {
    directory: DirectoryService,
    email: EmailService,
}

impl ApprovalService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            directory: DirectoryService::new(config),
            email: EmailService::new(config),
        }
    }

    pub async fn pending_doctors(&self) -> Result<Vec<DoctorProfile>, DoctorError> {
        self.directory.list_pending().await
    }

    pub async fn all_doctors(&self) -> Result<Vec<DoctorProfile>, DoctorError> {
        self.directory.list_verified().await
    }

    pub async fn approve(&self, doctor_id: Uuid) -> Result<DoctorProfile, DoctorError> {
        let doctor = self
            .directory
            .set_status(doctor_id, DoctorStatus::Approved)
            .await?;

        info!("Doctor {} approved", doctor_id);

        if let Err(e) = self
            .email
            .send_doctor_approval_email(&doctor.email, &doctor.name)
            .await
        {
            error!("Approval email failed: {}", e);
        }

        Ok(doctor)
    }

    pub async fn reject(
        &self,
        doctor_id: Uuid,
        reason: Option<String>,
    ) -> Result<DoctorProfile, DoctorError> {
        let doctor = self
            .directory
            .set_status(doctor_id, DoctorStatus::Rejected)
            .await?;

        info!("Doctor {} rejected", doctor_id);

        if let Err(e) = self
            .email
            .send_doctor_rejection_email(&doctor.email, &doctor.name, reason.as_deref())
            .await
        {
            error!("Rejection email failed: {}", e);
        }

        Ok(doctor)
    }
}
