use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentStats, AppointmentStatus, StatusCounts,
};
use crate::services::conflict::ConflictCheckService;

#[derive(Debug, Default, Clone)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub struct QueryService {
    store: Arc<StoreClient>,
}

impl QueryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(StoreClient::new(config)),
        }
    }

    pub fn with_store(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    pub async fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
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

    /// Doctor-side listing, newest day first.
    pub async fn for_doctor(
        &self,
        doctor_id: Uuid,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut filters = vec![format!("doctor_id=eq.{}", doctor_id)];
        Self::push_common_filters(&mut filters, filter);

        debug!("Listing appointments for doctor {}", doctor_id);
        self.select(filters, filter.limit).await
    }

    pub async fn pending_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let filters = vec![
            format!("doctor_id=eq.{}", doctor_id),
            "status=eq.pending".to_string(),
        ];
        self.select(filters, None).await
    }

    pub async fn for_patient(&self, email: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let filters = vec![format!(
            "patient_email=eq.{}",
            urlencoding::encode(&email.trim().to_lowercase())
        )];
        self.select(filters, None).await
    }

    /// Unscoped listing for the admin dashboard.
    pub async fn all(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut filters = Vec::new();
        Self::push_common_filters(&mut filters, filter);
        if let Some(offset) = filter.offset {
            filters.push(format!("offset={}", offset));
        }
        self.select(filters, filter.limit.or(Some(100))).await
    }

    /// Dashboard counters for one doctor, computed over the doctor's
    /// full history in one fetch.
    pub async fn stats(&self, doctor_id: Uuid) -> Result<AppointmentStats, AppointmentError> {
        let appointments = self
            .for_doctor(doctor_id, &AppointmentFilter::default())
            .await?;

        let now = Utc::now();
        let today = now.date_naive();
        let mut stats = AppointmentStats {
            total: appointments.len(),
            ..AppointmentStats::default()
        };

        for apt in &appointments {
            let is_today = apt.appointment_date.date_naive() == today;
            if is_today {
                stats.today += 1;
                if apt.status == AppointmentStatus::Confirmed {
                    stats.confirmed_today += 1;
                }
            }
            if apt.status.is_active() && apt.appointment_date >= now {
                stats.upcoming += 1;
            }
            count_status(&mut stats.by_status, apt.status);
        }
        stats.completed = stats.by_status.completed;
        stats.pending = stats.by_status.pending;

        Ok(stats)
    }

    fn push_common_filters(filters: &mut Vec<String>, filter: &AppointmentFilter) {
        if let Some(status) = filter.status {
            filters.push(format!("status=eq.{}", status));
        }
        if let Some(date) = filter.date {
            let (start, end) = ConflictCheckService::day_bounds(date);
            filters.push(format!("appointment_date=gte.{}", start.to_rfc3339()));
            filters.push(format!("appointment_date=lte.{}", end.to_rfc3339()));
        }
    }

    async fn select(
        &self,
        filters: Vec<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.store
            .select(
                "appointments",
                &filters,
                Some("appointment_date.desc"),
                limit,
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }
}

fn count_status(counts: &mut StatusCounts, status: AppointmentStatus) {
    match status {
        AppointmentStatus::Pending => counts.pending += 1,
        AppointmentStatus::Approved => counts.approved += 1,
        AppointmentStatus::Rejected => counts.rejected += 1,
        AppointmentStatus::Confirmed => counts.confirmed += 1,
        AppointmentStatus::Cancelled => counts.cancelled += 1,
        AppointmentStatus::Completed => counts.completed += 1,
        AppointmentStatus::Rescheduled => counts.rescheduled += 1,
    }
}
