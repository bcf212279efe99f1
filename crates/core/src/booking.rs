//! # Appointment Lifecycle
//!
//! [`BookingService`] is the only writer of appointment rows. It validates
//! every request against the master's working hours, the clock and the
//! existing bookings, persists the change, then tells the notifier.
//!
//! ## Failure semantics
//!
//! - Validation, authorization and conflict failures are returned before any
//!   write happens.
//! - The application-level overlap check is advisory; the store's atomic
//!   insert/update is the authority and reports races as `Conflict`.
//! - Notification happens after the write and cannot undo it.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::errors::{SalonError, SalonResult};
use crate::lifecycle;
use crate::models::{
    actor::Actor,
    appointment::{
        Appointment, AppointmentHistoryEntry, AppointmentStatus, NewAppointment, NewTimes,
    },
    catalog::{Master, Service},
    work_schedule::{self, ScheduleException, WorkSchedule, WorkingWindow},
};
use crate::notify::{Notification, NotificationKind, Notifier};
use crate::slots::{self, Interval, SlotParams};
use crate::store::{AppointmentStore, CatalogStore};

/// Salon-wide booking settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingSettings {
    /// Granularity of offered start times.
    pub slot_step: Duration,
    /// Time zone in which calendar dates and working hours are read.
    pub timezone: Tz,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            slot_step: Duration::minutes(30),
            timezone: chrono_tz::Europe::Moscow,
        }
    }
}

pub struct BookingService {
    catalog: Arc<dyn CatalogStore>,
    appointments: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    settings: BookingSettings,
}

impl BookingService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        appointments: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        settings: BookingSettings,
    ) -> Self {
        Self {
            catalog,
            appointments,
            notifier,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &BookingSettings {
        &self.settings
    }

    // ── Slots ──

    /// Free start times for a service with a master on a local calendar date.
    pub async fn free_slots(
        &self,
        master_id: Uuid,
        service_id: Uuid,
        date: NaiveDate,
    ) -> SalonResult<Vec<DateTime<Utc>>> {
        let master = self.load_master(master_id).await?;
        let service = self.load_service(service_id).await?;

        let Some(window) = self.working_window(master.id, date).await? else {
            return Ok(Vec::new());
        };

        let params = self.slot_params(&master, &service);
        let bookings = self
            .appointments
            .list_occupying(
                master.id,
                window.start,
                window
                    .end
                    .checked_add_signed(params.break_padding)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
                None,
            )
            .await?;

        slots::compute_free_slots(&window, &bookings, &params, self.clock.now())
    }

    // ── Lifecycle operations ──

    pub async fn create(
        &self,
        client_id: Uuid,
        master_id: Uuid,
        service_id: Uuid,
        start_time: DateTime<Utc>,
        notes: Option<String>,
    ) -> SalonResult<Appointment> {
        let master = self.load_master(master_id).await?;
        let service = self.load_service(service_id).await?;
        let params = self.slot_params(&master, &service);
        params.validate()?;

        let now = self.clock.now();
        let times = self
            .validate_booking_time(&master, &params, start_time, now, None)
            .await?;

        let id = Uuid::new_v4();
        let new = NewAppointment {
            id,
            client_id,
            master_id: master.id,
            service_id: service.id,
            start_time: times.start_time,
            end_time: times.end_time,
            blocked_until: times.blocked_until,
            price: service.price,
            notes,
            created_at: now,
        };
        let history = AppointmentHistoryEntry {
            id: Uuid::new_v4(),
            appointment_id: id,
            from_status: None,
            to_status: AppointmentStatus::Pending,
            previous_start: None,
            previous_end: None,
            actor_id: Some(client_id),
            note: None,
            recorded_at: now,
        };

        let appointment = self
            .appointments
            .insert_appointment(new, history)
            .await
            .inspect_err(|e| {
                if matches!(e, SalonError::Conflict(_)) {
                    warn!(%master_id, %start_time, "Booking lost a race for the slot");
                }
            })?;

        info!(
            appointment_id = %appointment.id,
            %client_id,
            %master_id,
            %start_time,
            "Appointment created"
        );
        self.notify(&appointment, NotificationKind::Created, None);
        Ok(appointment)
    }

    pub async fn cancel(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
        reason: Option<String>,
    ) -> SalonResult<Appointment> {
        let current = self.load_appointment(appointment_id).await?;
        ensure_owner(actor, &current)?;
        lifecycle::ensure_transition(current.status, AppointmentStatus::Cancelled)?;

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let history = self.history_entry(
            &current,
            AppointmentStatus::Cancelled,
            actor,
            reason.clone(),
            false,
        );
        let appointment = self
            .appointments
            .update_status(
                current.id,
                current.status,
                AppointmentStatus::Cancelled,
                reason.clone(),
                history,
            )
            .await?;

        info!(
            appointment_id = %appointment.id,
            actor_id = %actor.id,
            role = %actor.role,
            "Appointment cancelled"
        );
        self.notify(&appointment, NotificationKind::Cancelled, reason);
        Ok(appointment)
    }

    pub async fn reschedule(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
        new_start: DateTime<Utc>,
    ) -> SalonResult<Appointment> {
        let current = self.load_appointment(appointment_id).await?;
        ensure_owner(actor, &current)?;
        lifecycle::ensure_transition(current.status, AppointmentStatus::Rescheduled)?;

        let master = self.load_master(current.master_id).await?;
        // Duration and break stay as snapshotted at booking time.
        let params = SlotParams {
            duration: current.duration(),
            step: self.settings.slot_step,
            break_padding: current.break_padding(),
        };
        let now = self.clock.now();
        let times = self
            .validate_booking_time(&master, &params, new_start, now, Some(current.id))
            .await?;

        let history =
            self.history_entry(&current, AppointmentStatus::Rescheduled, actor, None, true);
        let appointment = self
            .appointments
            .update_times(
                current.id,
                current.status,
                times,
                AppointmentStatus::Rescheduled,
                history,
            )
            .await?;

        info!(
            appointment_id = %appointment.id,
            from = %current.start_time,
            to = %new_start,
            "Appointment rescheduled"
        );
        self.notify(&appointment, NotificationKind::Rescheduled, None);
        Ok(appointment)
    }

    pub async fn confirm(&self, actor: &Actor, appointment_id: Uuid) -> SalonResult<Appointment> {
        ensure_admin(actor, "confirm appointments")?;
        let current = self.load_appointment(appointment_id).await?;
        lifecycle::ensure_transition(current.status, AppointmentStatus::Confirmed)?;

        let history = self.history_entry(&current, AppointmentStatus::Confirmed, actor, None, false);
        let appointment = self
            .appointments
            .update_status(
                current.id,
                current.status,
                AppointmentStatus::Confirmed,
                None,
                history,
            )
            .await?;

        info!(appointment_id = %appointment.id, "Appointment confirmed");
        self.notify(&appointment, NotificationKind::Confirmed, None);
        Ok(appointment)
    }

    pub async fn complete(&self, actor: &Actor, appointment_id: Uuid) -> SalonResult<Appointment> {
        ensure_admin(actor, "complete appointments")?;
        let current = self.load_appointment(appointment_id).await?;
        lifecycle::ensure_transition(current.status, AppointmentStatus::Completed)?;
        if current.end_time > self.clock.now() {
            return Err(SalonError::Validation(
                "Appointment has not finished yet".to_string(),
            ));
        }

        let history = self.history_entry(&current, AppointmentStatus::Completed, actor, None, false);
        let appointment = self
            .appointments
            .update_status(
                current.id,
                current.status,
                AppointmentStatus::Completed,
                None,
                history,
            )
            .await?;

        info!(appointment_id = %appointment.id, "Appointment completed");
        self.notify(&appointment, NotificationKind::Completed, None);
        Ok(appointment)
    }

    // ── Reads ──

    pub async fn get(&self, actor: &Actor, appointment_id: Uuid) -> SalonResult<Appointment> {
        let appointment = self.load_appointment(appointment_id).await?;
        ensure_owner(actor, &appointment)?;
        Ok(appointment)
    }

    pub async fn history(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
    ) -> SalonResult<Vec<AppointmentHistoryEntry>> {
        let appointment = self.get(actor, appointment_id).await?;
        self.appointments.list_history(appointment.id).await
    }

    pub async fn list_for_client(&self, actor: &Actor) -> SalonResult<Vec<Appointment>> {
        self.appointments.list_for_client(actor.id).await
    }

    pub async fn list_for_master(
        &self,
        actor: &Actor,
        master_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> SalonResult<Vec<Appointment>> {
        ensure_admin(actor, "list master appointments")?;
        if from >= to {
            return Err(SalonError::Validation(
                "`from` must be earlier than `to`".to_string(),
            ));
        }
        self.appointments.list_for_master(master_id, from, to).await
    }

    // ── Work schedule management ──

    pub async fn work_schedule(&self, master_id: Uuid) -> SalonResult<Vec<WorkSchedule>> {
        let master = self.load_master(master_id).await?;
        self.catalog.list_work_schedule(master.id).await
    }

    pub async fn replace_work_schedule(
        &self,
        actor: &Actor,
        master_id: Uuid,
        rows: Vec<WorkSchedule>,
    ) -> SalonResult<Vec<WorkSchedule>> {
        ensure_admin(actor, "edit work schedules")?;
        let master = self.load_master(master_id).await?;

        let mut seen = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.master_id != master.id {
                return Err(SalonError::Validation(
                    "Schedule row belongs to a different master".to_string(),
                ));
            }
            row.validate()?;
            if seen.contains(&row.day_of_week) {
                return Err(SalonError::Validation(format!(
                    "Duplicate schedule row for {}",
                    row.day_of_week
                )));
            }
            seen.push(row.day_of_week);
        }

        let saved = self.catalog.replace_work_schedule(master.id, rows).await?;
        info!(master_id = %master.id, rows = saved.len(), "Work schedule replaced");
        Ok(saved)
    }

    pub async fn exceptions(&self, master_id: Uuid) -> SalonResult<Vec<ScheduleException>> {
        let master = self.load_master(master_id).await?;
        self.catalog.list_exceptions(master.id).await
    }

    pub async fn replace_exceptions(
        &self,
        actor: &Actor,
        master_id: Uuid,
        rows: Vec<ScheduleException>,
    ) -> SalonResult<Vec<ScheduleException>> {
        ensure_admin(actor, "edit schedule exceptions")?;
        let master = self.load_master(master_id).await?;

        let mut seen = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.master_id != master.id {
                return Err(SalonError::Validation(
                    "Exception belongs to a different master".to_string(),
                ));
            }
            row.validate()?;
            if seen.contains(&row.date) {
                return Err(SalonError::Validation(format!(
                    "Duplicate exception for {}",
                    row.date
                )));
            }
            seen.push(row.date);
        }

        let saved = self.catalog.replace_exceptions(master.id, rows).await?;
        info!(master_id = %master.id, rows = saved.len(), "Schedule exceptions replaced");
        Ok(saved)
    }

    // ── Helpers ──

    async fn load_master(&self, id: Uuid) -> SalonResult<Master> {
        self.catalog
            .find_master(id)
            .await?
            .filter(|m| m.is_active)
            .ok_or_else(|| SalonError::NotFound(format!("Master with ID {} not found", id)))
    }

    async fn load_service(&self, id: Uuid) -> SalonResult<Service> {
        self.catalog
            .find_service(id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| SalonError::NotFound(format!("Service with ID {} not found", id)))
    }

    async fn load_appointment(&self, id: Uuid) -> SalonResult<Appointment> {
        self.appointments
            .find_appointment(id)
            .await?
            .ok_or_else(|| SalonError::NotFound(format!("Appointment with ID {} not found", id)))
    }

    async fn working_window(
        &self,
        master_id: Uuid,
        date: NaiveDate,
    ) -> SalonResult<Option<WorkingWindow>> {
        let exception = self.catalog.schedule_exception(master_id, date).await?;
        let weekly = match exception {
            Some(_) => None,
            None => {
                self.catalog
                    .work_schedule_for_day(master_id, date.weekday())
                    .await?
            }
        };
        Ok(work_schedule::resolve_window(
            weekly.as_ref(),
            exception.as_ref(),
            date,
            self.settings.timezone,
        ))
    }

    fn slot_params(&self, master: &Master, service: &Service) -> SlotParams {
        SlotParams {
            duration: service.duration(),
            step: self.settings.slot_step,
            break_padding: master.break_duration(),
        }
    }

    /// Future, inside working hours, and free of overlaps (ignoring `exclude`).
    ///
    /// Returns the end and blocked-until instants of the checked booking.
    async fn validate_booking_time(
        &self,
        master: &Master,
        params: &SlotParams,
        start: DateTime<Utc>,
        now: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> SalonResult<NewTimes> {
        if start <= now {
            return Err(SalonError::Validation(
                "Start time must be in the future".to_string(),
            ));
        }

        let times = params
            .booking_times(start)
            .ok_or_else(|| SalonError::Validation("Start time is out of range".to_string()))?;
        let date = work_schedule::local_date(self.settings.timezone, start);
        let window = self.working_window(master.id, date).await?;
        match window {
            Some(window) if window.contains(start, times.end_time) => {}
            _ => {
                return Err(SalonError::Validation(
                    "Requested time is outside the master's working hours".to_string(),
                ));
            }
        }

        let guarded = Interval::new(times.start_time, times.blocked_until);
        let nearby = self
            .appointments
            .list_occupying(master.id, guarded.start, guarded.end, exclude)
            .await?;
        if let Some(existing) = slots::find_conflict(&guarded, &nearby) {
            warn!(
                master_id = %master.id,
                %start,
                conflicting = %existing.id,
                "Requested time overlaps an existing appointment"
            );
            return Err(SalonError::Conflict(
                "Requested time overlaps an existing appointment".to_string(),
            ));
        }
        Ok(times)
    }

    fn history_entry(
        &self,
        current: &Appointment,
        to_status: AppointmentStatus,
        actor: &Actor,
        note: Option<String>,
        record_times: bool,
    ) -> AppointmentHistoryEntry {
        AppointmentHistoryEntry {
            id: Uuid::new_v4(),
            appointment_id: current.id,
            from_status: Some(current.status),
            to_status,
            previous_start: record_times.then_some(current.start_time),
            previous_end: record_times.then_some(current.end_time),
            actor_id: Some(actor.id),
            note,
            recorded_at: self.clock.now(),
        }
    }

    fn notify(&self, appointment: &Appointment, kind: NotificationKind, reason: Option<String>) {
        self.notifier.dispatch(Notification {
            appointment_id: appointment.id,
            kind,
            recipient_id: appointment.client_id,
            starts_at: appointment.start_time,
            reason,
        });
    }
}

fn ensure_owner(actor: &Actor, appointment: &Appointment) -> SalonResult<()> {
    if actor.may_act_for(appointment.client_id) {
        return Ok(());
    }
    warn!(
        actor_id = %actor.id,
        appointment_id = %appointment.id,
        "Actor tried to act on another client's appointment"
    );
    Err(SalonError::Authorization(
        "Only the owner or an admin may change this appointment".to_string(),
    ))
}

fn ensure_admin(actor: &Actor, action: &str) -> SalonResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(SalonError::Authorization(format!("Only admins may {}", action)))
    }
}
