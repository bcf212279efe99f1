//! In-process store used by tests and local demos.
//!
//! Every mutation runs under one mutex, which gives the same all-or-nothing
//! overlap guarantee the PostgreSQL exclusion constraint gives in production.
//! It is only valid for a single process.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AppointmentStore, CatalogStore, ClientDirectory};
use crate::errors::{SalonError, SalonResult};
use crate::models::{
    appointment::{
        Appointment, AppointmentHistoryEntry, AppointmentStatus, NewAppointment, NewTimes,
    },
    catalog::{ClientContact, Master, Service},
    work_schedule::{ScheduleException, WorkSchedule},
};
use crate::slots::Interval;

#[derive(Default)]
struct State {
    masters: HashMap<Uuid, Master>,
    services: HashMap<Uuid, Service>,
    clients: HashMap<Uuid, ClientContact>,
    schedules: Vec<WorkSchedule>,
    exceptions: Vec<ScheduleException>,
    appointments: HashMap<Uuid, Appointment>,
    history: Vec<AppointmentHistoryEntry>,
}

impl State {
    fn overlapping(&self, master_id: Uuid, range: Interval, exclude: Option<Uuid>) -> bool {
        self.appointments.values().any(|a| {
            a.master_id == master_id
                && Some(a.id) != exclude
                && a.status.occupies_slot()
                && Interval::from(a).overlaps(&range)
        })
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_master(&self, master: Master) {
        self.state.lock().await.masters.insert(master.id, master);
    }

    pub async fn add_service(&self, service: Service) {
        self.state.lock().await.services.insert(service.id, service);
    }

    pub async fn add_client(&self, client: ClientContact) {
        self.state.lock().await.clients.insert(client.id, client);
    }

    pub async fn add_work_schedule(&self, row: WorkSchedule) {
        let mut state = self.state.lock().await;
        state
            .schedules
            .retain(|s| !(s.master_id == row.master_id && s.day_of_week == row.day_of_week));
        state.schedules.push(row);
    }

    pub async fn add_exception(&self, row: ScheduleException) {
        let mut state = self.state.lock().await;
        state
            .exceptions
            .retain(|e| !(e.master_id == row.master_id && e.date == row.date));
        state.exceptions.push(row);
    }

    /// Number of stored appointments, any status.
    pub async fn appointment_count(&self) -> usize {
        self.state.lock().await.appointments.len()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn find_master(&self, id: Uuid) -> SalonResult<Option<Master>> {
        Ok(self.state.lock().await.masters.get(&id).cloned())
    }

    async fn find_service(&self, id: Uuid) -> SalonResult<Option<Service>> {
        Ok(self.state.lock().await.services.get(&id).cloned())
    }

    async fn work_schedule_for_day(
        &self,
        master_id: Uuid,
        day: Weekday,
    ) -> SalonResult<Option<WorkSchedule>> {
        let state = self.state.lock().await;
        Ok(state
            .schedules
            .iter()
            .find(|s| s.master_id == master_id && s.day_of_week == day)
            .cloned())
    }

    async fn schedule_exception(
        &self,
        master_id: Uuid,
        date: NaiveDate,
    ) -> SalonResult<Option<ScheduleException>> {
        let state = self.state.lock().await;
        Ok(state
            .exceptions
            .iter()
            .find(|e| e.master_id == master_id && e.date == date)
            .cloned())
    }

    async fn list_work_schedule(&self, master_id: Uuid) -> SalonResult<Vec<WorkSchedule>> {
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .schedules
            .iter()
            .filter(|s| s.master_id == master_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.day_of_week.num_days_from_monday());
        Ok(rows)
    }

    async fn replace_work_schedule(
        &self,
        master_id: Uuid,
        rows: Vec<WorkSchedule>,
    ) -> SalonResult<Vec<WorkSchedule>> {
        {
            let mut state = self.state.lock().await;
            if !state.masters.contains_key(&master_id) {
                return Err(SalonError::NotFound(format!(
                    "Master with ID {} not found",
                    master_id
                )));
            }
            state.schedules.retain(|s| s.master_id != master_id);
            state.schedules.extend(rows);
        }
        self.list_work_schedule(master_id).await
    }

    async fn list_exceptions(&self, master_id: Uuid) -> SalonResult<Vec<ScheduleException>> {
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .exceptions
            .iter()
            .filter(|e| e.master_id == master_id)
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.date);
        Ok(rows)
    }

    async fn replace_exceptions(
        &self,
        master_id: Uuid,
        rows: Vec<ScheduleException>,
    ) -> SalonResult<Vec<ScheduleException>> {
        {
            let mut state = self.state.lock().await;
            if !state.masters.contains_key(&master_id) {
                return Err(SalonError::NotFound(format!(
                    "Master with ID {} not found",
                    master_id
                )));
            }
            state.exceptions.retain(|e| e.master_id != master_id);
            state.exceptions.extend(rows);
        }
        self.list_exceptions(master_id).await
    }
}

#[async_trait]
impl AppointmentStore for InMemoryStore {
    async fn find_appointment(&self, id: Uuid) -> SalonResult<Option<Appointment>> {
        Ok(self.state.lock().await.appointments.get(&id).cloned())
    }

    async fn list_occupying(
        &self,
        master_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> SalonResult<Vec<Appointment>> {
        let range = Interval::new(from, to);
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .appointments
            .values()
            .filter(|a| {
                a.master_id == master_id
                    && Some(a.id) != exclude
                    && a.status.occupies_slot()
                    && Interval::from(*a).overlaps(&range)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.start_time);
        Ok(rows)
    }

    async fn list_for_client(&self, client_id: Uuid) -> SalonResult<Vec<Appointment>> {
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .appointments
            .values()
            .filter(|a| a.client_id == client_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.start_time);
        Ok(rows)
    }

    async fn list_for_master(
        &self,
        master_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> SalonResult<Vec<Appointment>> {
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .appointments
            .values()
            .filter(|a| a.master_id == master_id && a.start_time >= from && a.start_time < to)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.start_time);
        Ok(rows)
    }

    async fn insert_appointment(
        &self,
        appointment: NewAppointment,
        history: AppointmentHistoryEntry,
    ) -> SalonResult<Appointment> {
        let mut state = self.state.lock().await;
        let range = Interval::new(appointment.start_time, appointment.blocked_until);
        if state.overlapping(appointment.master_id, range, None) {
            return Err(SalonError::Conflict(
                "Requested time overlaps an existing appointment".to_string(),
            ));
        }
        if state.appointments.contains_key(&appointment.id) {
            return Err(SalonError::Conflict(format!(
                "Appointment {} already exists",
                appointment.id
            )));
        }

        let stored = appointment.into_appointment();
        state.appointments.insert(stored.id, stored.clone());
        state.history.push(history);
        Ok(stored)
    }

    async fn update_times(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        times: NewTimes,
        status: AppointmentStatus,
        history: AppointmentHistoryEntry,
    ) -> SalonResult<Appointment> {
        let mut state = self.state.lock().await;
        let current = state
            .appointments
            .get(&id)
            .cloned()
            .ok_or_else(|| SalonError::NotFound(format!("Appointment with ID {} not found", id)))?;
        if current.status != expected {
            return Err(SalonError::Conflict(format!(
                "Appointment {} changed concurrently",
                id
            )));
        }
        let range = Interval::new(times.start_time, times.blocked_until);
        if state.overlapping(current.master_id, range, Some(id)) {
            return Err(SalonError::Conflict(
                "Requested time overlaps an existing appointment".to_string(),
            ));
        }

        let updated = Appointment {
            start_time: times.start_time,
            end_time: times.end_time,
            blocked_until: times.blocked_until,
            status,
            updated_at: history.recorded_at,
            ..current
        };
        state.appointments.insert(id, updated.clone());
        state.history.push(history);
        Ok(updated)
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        status: AppointmentStatus,
        cancellation_reason: Option<String>,
        history: AppointmentHistoryEntry,
    ) -> SalonResult<Appointment> {
        let mut state = self.state.lock().await;
        let appointment = state
            .appointments
            .get_mut(&id)
            .ok_or_else(|| SalonError::NotFound(format!("Appointment with ID {} not found", id)))?;
        if appointment.status != expected {
            return Err(SalonError::Conflict(format!(
                "Appointment {} changed concurrently",
                id
            )));
        }

        appointment.status = status;
        if cancellation_reason.is_some() {
            appointment.cancellation_reason = cancellation_reason;
        }
        appointment.updated_at = history.recorded_at;
        let updated = appointment.clone();
        state.history.push(history);
        Ok(updated)
    }

    async fn list_history(
        &self,
        appointment_id: Uuid,
    ) -> SalonResult<Vec<AppointmentHistoryEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .history
            .iter()
            .filter(|h| h.appointment_id == appointment_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ClientDirectory for InMemoryStore {
    async fn find_client(&self, id: Uuid) -> SalonResult<Option<ClientContact>> {
        Ok(self.state.lock().await.clients.get(&id).cloned())
    }
}

