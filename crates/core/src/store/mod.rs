//! Persistence seams used by the booking flow.
//!
//! Implementations must uphold one rule the application layer cannot enforce
//! on its own: `insert_appointment` and `update_times` reject (with
//! [`SalonError::Conflict`](crate::errors::SalonError::Conflict)) any write
//! that would make two slot-occupying appointments of the same master overlap
//! on `[start_time, blocked_until)`. The check and the write happen as one
//! atomic step, so concurrent requests cannot both pass it.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use uuid::Uuid;

use crate::errors::SalonResult;
use crate::models::{
    appointment::{
        Appointment, AppointmentHistoryEntry, AppointmentStatus, NewAppointment, NewTimes,
    },
    catalog::{ClientContact, Master, Service},
    work_schedule::{ScheduleException, WorkSchedule},
};

/// Read access to masters and services plus schedule management.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_master(&self, id: Uuid) -> SalonResult<Option<Master>>;

    async fn find_service(&self, id: Uuid) -> SalonResult<Option<Service>>;

    async fn work_schedule_for_day(
        &self,
        master_id: Uuid,
        day: Weekday,
    ) -> SalonResult<Option<WorkSchedule>>;

    async fn schedule_exception(
        &self,
        master_id: Uuid,
        date: NaiveDate,
    ) -> SalonResult<Option<ScheduleException>>;

    async fn list_work_schedule(&self, master_id: Uuid) -> SalonResult<Vec<WorkSchedule>>;

    /// Replaces every weekly row of the master in one step.
    async fn replace_work_schedule(
        &self,
        master_id: Uuid,
        rows: Vec<WorkSchedule>,
    ) -> SalonResult<Vec<WorkSchedule>>;

    async fn list_exceptions(&self, master_id: Uuid) -> SalonResult<Vec<ScheduleException>>;

    /// Replaces the master's exception list in one step.
    async fn replace_exceptions(
        &self,
        master_id: Uuid,
        rows: Vec<ScheduleException>,
    ) -> SalonResult<Vec<ScheduleException>>;
}

/// Durable appointment records.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find_appointment(&self, id: Uuid) -> SalonResult<Option<Appointment>>;

    /// Slot-occupying appointments of a master whose protected range
    /// intersects `[from, to)`, ordered by start time.
    async fn list_occupying(
        &self,
        master_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> SalonResult<Vec<Appointment>>;

    async fn list_for_client(&self, client_id: Uuid) -> SalonResult<Vec<Appointment>>;

    /// All appointments of a master starting in `[from, to)`, any status.
    async fn list_for_master(
        &self,
        master_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> SalonResult<Vec<Appointment>>;

    /// Inserts a pending appointment together with its first history entry.
    async fn insert_appointment(
        &self,
        appointment: NewAppointment,
        history: AppointmentHistoryEntry,
    ) -> SalonResult<Appointment>;

    /// Moves an appointment to new times if it is still in `expected` status.
    async fn update_times(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        times: NewTimes,
        status: AppointmentStatus,
        history: AppointmentHistoryEntry,
    ) -> SalonResult<Appointment>;

    /// Changes status if the appointment is still in `expected` status.
    async fn update_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        status: AppointmentStatus,
        cancellation_reason: Option<String>,
        history: AppointmentHistoryEntry,
    ) -> SalonResult<Appointment>;

    async fn list_history(
        &self,
        appointment_id: Uuid,
    ) -> SalonResult<Vec<AppointmentHistoryEntry>>;
}

/// Lookup of notification recipients.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn find_client(&self, id: Uuid) -> SalonResult<Option<ClientContact>>;
}
