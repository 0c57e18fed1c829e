use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::store::StoreClient;

use crate::models::{Appointment, AppointmentError};

/// Pre-booking slot check. This is a check-then-act guard with no
/// transactional backing: two bookings racing for the same slot can both
/// pass before either insert lands. That matches the behavior of the
/// write path this system replaces.
pub struct ConflictCheckService {
    store: Arc<StoreClient>,
}

impl ConflictCheckService {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    /// Calendar-day bounds for a requested date.
    pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end = date.and_hms_milli_opt(23, 59, 59, 999).unwrap().and_utc();
        (start, end)
    }

    /// True when the doctor already holds an active (pending or confirmed)
    /// appointment for this day and exact slot label. Slot equality is
    /// string equality; different labels never conflict even if their
    /// wall-clock ranges would overlap.
    pub async fn has_conflict(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time_slot: &str,
    ) -> Result<bool, AppointmentError> {
        debug!(
            "Checking slot conflict for doctor {} on {} at {:?}",
            doctor_id, date, time_slot
        );

        let (start, end) = Self::day_bounds(date);

        let existing: Vec<Appointment> = self
            .store
            .select(
                "appointments",
                &[
                    format!("doctor_id=eq.{}", doctor_id),
                    format!("appointment_date=gte.{}", start.to_rfc3339()),
                    format!("appointment_date=lte.{}", end.to_rfc3339()),
                    format!("appointment_time=eq.{}", urlencoding::encode(time_slot)),
                    "status=in.(pending,confirmed)".to_string(),
                ],
                None,
                Some(1),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let conflict = !existing.is_empty();
        if conflict {
            warn!(
                "Slot conflict for doctor {} on {} at {:?}",
                doctor_id, date, time_slot
            );
        }

        Ok(conflict)
    }
}
