use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;

use crate::models::{Doctor, DoctorError, DoctorProfile, DoctorStatus, UpdateDoctorRequest};

/// Doctor directory backed by the document store.
pub struct DirectoryService {
    store: Arc<StoreClient>,
}

impl DirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(StoreClient::new(config)),
        }
    }

    pub fn with_store(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    /// All email-verified doctors, newest first.
    pub async fn list_verified(&self) -> Result<Vec<DoctorProfile>, DoctorError> {
        let doctors: Vec<Doctor> = self
            .store
            .select(
                "doctors",
                &["is_email_verified=eq.true".to_string()],
                Some("created_at.desc"),
                None,
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        Ok(doctors.into_iter().map(DoctorProfile::from).collect())
    }

    pub async fn get(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        let doctors: Vec<Doctor> = self
            .store
            .select(
                "doctors",
                &[format!("id=eq.{}", doctor_id)],
                None,
                Some(1),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        doctors.into_iter().next().ok_or(DoctorError::NotFound)
    }

    pub async fn get_profile(&self, doctor_id: Uuid) -> Result<DoctorProfile, DoctorError> {
        self.get(doctor_id).await.map(DoctorProfile::from)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, DoctorError> {
        let doctors: Vec<Doctor> = self
            .store
            .select(
                "doctors",
                &[format!("email=eq.{}", urlencoding::encode(email))],
                None,
                Some(1),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        Ok(doctors.into_iter().next())
    }

    /// Case-insensitive substring search on specialization, approved and
    /// email-verified doctors only. Used by the triage cell to suggest
    /// specialists.
    pub async fn find_by_specialization(
        &self,
        specialization: &str,
        limit: usize,
    ) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Searching doctors by specialization {:?}", specialization);

        let pattern = format!("*{}*", specialization);
        let doctors: Vec<Doctor> = self
            .store
            .select(
                "doctors",
                &[
                    format!("specialization=ilike.{}", urlencoding::encode(&pattern)),
                    "is_email_verified=eq.true".to_string(),
                    "status=eq.approved".to_string(),
                ],
                None,
                Some(limit),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        Ok(doctors)
    }

    /// Update directory fields. Credentials, verification state and role
    /// cannot be changed through this path.
    pub async fn update(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
    ) -> Result<DoctorProfile, DoctorError> {
        let mut patch = serde_json::Map::new();

        if let Some(name) = request.name {
            patch.insert("name".to_string(), json!(name));
        }
        if let Some(specialization) = request.specialization {
            patch.insert("specialization".to_string(), json!(specialization));
        }
        if let Some(experience) = request.experience {
            patch.insert("experience".to_string(), json!(experience));
        }
        if let Some(hospital) = request.hospital {
            patch.insert("hospital".to_string(), json!(hospital));
        }
        if let Some(phone) = request.phone {
            patch.insert("phone".to_string(), json!(phone));
        }
        if let Some(location) = request.location {
            patch.insert("location".to_string(), json!(location));
        }

        if patch.is_empty() {
            return Err(DoctorError::Validation("No updatable fields provided".to_string()));
        }

        patch.insert("updated_at".to_string(), json!(chrono::Utc::now()));

        let updated: Vec<Doctor> = self
            .store
            .update(
                "doctors",
                &[format!("id=eq.{}", doctor_id)],
                Value::Object(patch),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        updated
            .into_iter()
            .next()
            .map(DoctorProfile::from)
            .ok_or(DoctorError::NotFound)
    }

    /// Set the approval status, returning the updated profile.
    pub async fn set_status(
        &self,
        doctor_id: Uuid,
        status: DoctorStatus,
    ) -> Result<DoctorProfile, DoctorError> {
        let updated: Vec<Doctor> = self
            .store
            .update(
                "doctors",
                &[format!("id=eq.{}", doctor_id)],
                json!({
                    "status": status,
                    "updated_at": chrono::Utc::now(),
                }),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        updated
            .into_iter()
            .next()
            .map(DoctorProfile::from)
            .ok_or(DoctorError::NotFound)
    }

    /// Pending doctors awaiting admin review. Only email-verified
    /// registrations are surfaced.
    pub async fn list_pending(&self) -> Result<Vec<DoctorProfile>, DoctorError> {
        let doctors: Vec<Doctor> = self
            .store
            .select(
                "doctors",
                &[
                    "status=eq.pending".to_string(),
                    "is_email_verified=eq.true".to_string(),
                ],
                Some("created_at.desc"),
                None,
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        Ok(doctors.into_iter().map(DoctorProfile::from).collect())
    }
}
