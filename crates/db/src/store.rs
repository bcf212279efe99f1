//! Postgres-backed implementation of the core storage traits.
//!
//! Every mutation writes the appointment row and its history entry in one
//! transaction. Slot overlap is enforced by the `appointments_no_overlap`
//! exclusion constraint; a violation comes back as `SalonError::Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use salon_core::errors::{SalonError, SalonResult};
use salon_core::models::{
    appointment::{
        Appointment, AppointmentHistoryEntry, AppointmentStatus, NewAppointment, NewTimes,
    },
    catalog::{ClientContact, Master, Service},
    work_schedule::{ScheduleException, WorkSchedule, weekday_number},
};
use salon_core::store::{AppointmentStore, CatalogStore, ClientDirectory};
use tracing::warn;
use uuid::Uuid;

use crate::DbPool;
use crate::repositories::{appointment, catalog, history, work_schedule};
use crate::schema::NO_OVERLAP_CONSTRAINT;

const EXCLUSION_VIOLATION: &str = "23P01";
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const SERIALIZATION_FAILURE: &str = "40001";

/// Maps a Postgres SQLSTATE to the domain error it stands for, if any.
pub fn error_for_sqlstate(code: &str, constraint: Option<&str>) -> Option<SalonError> {
    match code {
        EXCLUSION_VIOLATION => Some(SalonError::Conflict(
            "Requested time overlaps an existing appointment".to_string(),
        )),
        SERIALIZATION_FAILURE => Some(SalonError::Conflict(
            "Concurrent update, please retry".to_string(),
        )),
        UNIQUE_VIOLATION => Some(SalonError::Conflict(format!(
            "Duplicate record ({})",
            constraint.unwrap_or("unique constraint")
        ))),
        FOREIGN_KEY_VIOLATION => Some(SalonError::NotFound(format!(
            "Referenced record does not exist ({})",
            constraint.unwrap_or("foreign key")
        ))),
        _ => None,
    }
}

/// Converts a repository error, recognising constraint violations.
fn db_error(report: eyre::Report) -> SalonError {
    if let Some(sqlx::Error::Database(db_err)) = report.downcast_ref::<sqlx::Error>() {
        if let Some(code) = db_err.code() {
            if let Some(mapped) = error_for_sqlstate(&code, db_err.constraint()) {
                if db_err.constraint() == Some(NO_OVERLAP_CONSTRAINT) {
                    warn!("Overlapping booking rejected by the database");
                }
                return mapped;
            }
        }
    }
    SalonError::Database(report)
}

fn sqlx_error(err: sqlx::Error) -> SalonError {
    db_error(eyre::Report::new(err))
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn ensure_master(&self, master_id: Uuid) -> SalonResult<()> {
        catalog::get_master_by_id(&self.pool, master_id)
            .await
            .map_err(db_error)?
            .map(|_| ())
            .ok_or_else(|| SalonError::NotFound(format!("Master with ID {} not found", master_id)))
    }

    /// Distinguishes "gone" from "changed under us" after a guarded update
    /// matched no row.
    async fn missed_update(&self, id: Uuid, expected: AppointmentStatus) -> SalonError {
        match appointment::get_appointment_by_id(&self.pool, id).await {
            Ok(Some(row)) => {
                warn!(
                    appointment_id = %id,
                    expected = %expected,
                    actual = %row.status,
                    "Appointment changed concurrently"
                );
                SalonError::Conflict(format!(
                    "Appointment {} changed concurrently (now {})",
                    id, row.status
                ))
            }
            Ok(None) => SalonError::NotFound(format!("Appointment with ID {} not found", id)),
            Err(e) => db_error(e),
        }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn find_master(&self, id: Uuid) -> SalonResult<Option<Master>> {
        let row = catalog::get_master_by_id(&self.pool, id)
            .await
            .map_err(db_error)?;
        Ok(row.map(Master::from))
    }

    async fn find_service(&self, id: Uuid) -> SalonResult<Option<Service>> {
        let row = catalog::get_service_by_id(&self.pool, id)
            .await
            .map_err(db_error)?;
        Ok(row.map(Service::from))
    }

    async fn work_schedule_for_day(
        &self,
        master_id: Uuid,
        day: Weekday,
    ) -> SalonResult<Option<WorkSchedule>> {
        work_schedule::get_work_schedule_for_day(&self.pool, master_id, weekday_number(day))
            .await
            .map_err(db_error)?
            .map(WorkSchedule::try_from)
            .transpose()
    }

    async fn schedule_exception(
        &self,
        master_id: Uuid,
        date: NaiveDate,
    ) -> SalonResult<Option<ScheduleException>> {
        let row = work_schedule::get_exception(&self.pool, master_id, date)
            .await
            .map_err(db_error)?;
        Ok(row.map(ScheduleException::from))
    }

    async fn list_work_schedule(&self, master_id: Uuid) -> SalonResult<Vec<WorkSchedule>> {
        work_schedule::list_work_schedule(&self.pool, master_id)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(WorkSchedule::try_from)
            .collect()
    }

    async fn replace_work_schedule(
        &self,
        master_id: Uuid,
        rows: Vec<WorkSchedule>,
    ) -> SalonResult<Vec<WorkSchedule>> {
        self.ensure_master(master_id).await?;

        let mut tx = self.pool.begin().await.map_err(sqlx_error)?;
        let saved = work_schedule::replace_work_schedule(&mut tx, master_id, &rows)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(sqlx_error)?;

        saved.into_iter().map(WorkSchedule::try_from).collect()
    }

    async fn list_exceptions(&self, master_id: Uuid) -> SalonResult<Vec<ScheduleException>> {
        let rows = work_schedule::list_exceptions(&self.pool, master_id)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(ScheduleException::from).collect())
    }

    async fn replace_exceptions(
        &self,
        master_id: Uuid,
        rows: Vec<ScheduleException>,
    ) -> SalonResult<Vec<ScheduleException>> {
        self.ensure_master(master_id).await?;

        let mut tx = self.pool.begin().await.map_err(sqlx_error)?;
        let saved = work_schedule::replace_exceptions(&mut tx, master_id, &rows)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(sqlx_error)?;

        Ok(saved.into_iter().map(ScheduleException::from).collect())
    }
}

#[async_trait]
impl AppointmentStore for PgStore {
    async fn find_appointment(&self, id: Uuid) -> SalonResult<Option<Appointment>> {
        appointment::get_appointment_by_id(&self.pool, id)
            .await
            .map_err(db_error)?
            .map(Appointment::try_from)
            .transpose()
    }

    async fn list_occupying(
        &self,
        master_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> SalonResult<Vec<Appointment>> {
        appointment::list_occupying(&self.pool, master_id, from, to, exclude)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(Appointment::try_from)
            .collect()
    }

    async fn list_for_client(&self, client_id: Uuid) -> SalonResult<Vec<Appointment>> {
        appointment::list_by_client(&self.pool, client_id)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(Appointment::try_from)
            .collect()
    }

    async fn list_for_master(
        &self,
        master_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> SalonResult<Vec<Appointment>> {
        appointment::list_by_master(&self.pool, master_id, from, to)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(Appointment::try_from)
            .collect()
    }

    async fn insert_appointment(
        &self,
        new: NewAppointment,
        entry: AppointmentHistoryEntry,
    ) -> SalonResult<Appointment> {
        let mut tx = self.pool.begin().await.map_err(sqlx_error)?;
        let row = appointment::insert_appointment(&mut tx, &new)
            .await
            .map_err(db_error)?;
        history::insert_history_entry(&mut tx, &entry)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(sqlx_error)?;

        Appointment::try_from(row)
    }

    async fn update_times(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        times: NewTimes,
        status: AppointmentStatus,
        entry: AppointmentHistoryEntry,
    ) -> SalonResult<Appointment> {
        let mut tx = self.pool.begin().await.map_err(sqlx_error)?;
        let updated =
            appointment::update_times(&mut tx, id, expected, &times, status, entry.recorded_at)
                .await
                .map_err(db_error)?;
        let Some(row) = updated else {
            tx.rollback().await.map_err(sqlx_error)?;
            return Err(self.missed_update(id, expected).await);
        };
        history::insert_history_entry(&mut tx, &entry)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(sqlx_error)?;

        Appointment::try_from(row)
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        status: AppointmentStatus,
        cancellation_reason: Option<String>,
        entry: AppointmentHistoryEntry,
    ) -> SalonResult<Appointment> {
        let mut tx = self.pool.begin().await.map_err(sqlx_error)?;
        let updated = appointment::update_status(
            &mut tx,
            id,
            expected,
            status,
            cancellation_reason.as_deref(),
            entry.recorded_at,
        )
        .await
        .map_err(db_error)?;
        let Some(row) = updated else {
            tx.rollback().await.map_err(sqlx_error)?;
            return Err(self.missed_update(id, expected).await);
        };
        history::insert_history_entry(&mut tx, &entry)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(sqlx_error)?;

        Appointment::try_from(row)
    }

    async fn list_history(
        &self,
        appointment_id: Uuid,
    ) -> SalonResult<Vec<AppointmentHistoryEntry>> {
        history::list_history(&self.pool, appointment_id)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(AppointmentHistoryEntry::try_from)
            .collect()
    }
}

#[async_trait]
impl ClientDirectory for PgStore {
    async fn find_client(&self, id: Uuid) -> SalonResult<Option<ClientContact>> {
        let row = catalog::get_client_by_id(&self.pool, id)
            .await
            .map_err(db_error)?;
        Ok(row.map(ClientContact::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::eyre;
    use rstest::rstest;

    #[rstest]
    #[case(EXCLUSION_VIOLATION)]
    #[case(SERIALIZATION_FAILURE)]
    #[case(UNIQUE_VIOLATION)]
    fn conflicting_writes_map_to_conflict(#[case] code: &str) {
        assert!(matches!(
            error_for_sqlstate(code, Some(NO_OVERLAP_CONSTRAINT)),
            Some(SalonError::Conflict(_))
        ));
    }

    #[test]
    fn missing_reference_maps_to_not_found() {
        assert!(matches!(
            error_for_sqlstate(FOREIGN_KEY_VIOLATION, Some("appointments_client_id_fkey")),
            Some(SalonError::NotFound(_))
        ));
    }

    #[test]
    fn other_codes_stay_database_errors() {
        assert!(error_for_sqlstate("42P01", None).is_none());
        assert!(matches!(
            db_error(eyre!("connection reset")),
            SalonError::Database(_)
        ));
    }
}
