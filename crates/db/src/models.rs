//! Row types as stored in Postgres, plus conversion into the core model.
//!
//! Conversions fail only on data the schema should have rejected (an unknown
//! status string, a weekday outside 1..=7); those surface as database errors.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eyre::eyre;
use salon_core::errors::SalonError;
use salon_core::models::{
    appointment::{Appointment, AppointmentHistoryEntry, AppointmentStatus},
    catalog::{ClientContact, Master, Service},
    work_schedule::{ScheduleException, WorkSchedule, weekday_from_number},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbMaster {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub break_minutes: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbService {
    pub id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbClient {
    pub id: Uuid,
    pub name: String,
    pub telegram_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWorkSchedule {
    pub id: Uuid,
    pub master_id: Uuid,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbScheduleException {
    pub id: Uuid,
    pub master_id: Uuid,
    pub date: NaiveDate,
    pub is_day_off: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub blocked_until: DateTime<Utc>,
    pub status: String,
    pub price: i64,
    pub bonus_points_used: i32,
    pub bonus_points_earned: i32,
    pub discount: i64,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointmentHistory {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub from_status: Option<String>,
    pub to_status: String,
    pub previous_start: Option<DateTime<Utc>>,
    pub previous_end: Option<DateTime<Utc>>,
    pub actor_id: Option<Uuid>,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

fn parse_status(raw: &str) -> Result<AppointmentStatus, SalonError> {
    raw.parse()
        .map_err(|_| SalonError::Database(eyre!("Stored appointment has unknown status '{}'", raw)))
}

impl From<DbMaster> for Master {
    fn from(row: DbMaster) -> Self {
        Master {
            id: row.id,
            name: row.name,
            is_active: row.is_active,
            break_minutes: row.break_minutes,
        }
    }
}

impl From<DbService> for Service {
    fn from(row: DbService) -> Self {
        Service {
            id: row.id,
            name: row.name,
            duration_minutes: row.duration_minutes,
            price: row.price,
            is_active: row.is_active,
        }
    }
}

impl From<DbClient> for ClientContact {
    fn from(row: DbClient) -> Self {
        ClientContact {
            id: row.id,
            name: row.name,
            telegram_id: row.telegram_id,
        }
    }
}

impl TryFrom<DbWorkSchedule> for WorkSchedule {
    type Error = SalonError;

    fn try_from(row: DbWorkSchedule) -> Result<Self, Self::Error> {
        let day_of_week = weekday_from_number(row.day_of_week)
            .map_err(|e| SalonError::Database(eyre!("Corrupt work schedule {}: {}", row.id, e)))?;
        Ok(WorkSchedule {
            master_id: row.master_id,
            day_of_week,
            start_time: row.start_time,
            end_time: row.end_time,
            is_active: row.is_active,
        })
    }
}

impl From<DbScheduleException> for ScheduleException {
    fn from(row: DbScheduleException) -> Self {
        ScheduleException {
            master_id: row.master_id,
            date: row.date,
            is_day_off: row.is_day_off,
            start_time: row.start_time,
            end_time: row.end_time,
        }
    }
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = SalonError;

    fn try_from(row: DbAppointment) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.id,
            client_id: row.client_id,
            master_id: row.master_id,
            service_id: row.service_id,
            start_time: row.start_time,
            end_time: row.end_time,
            blocked_until: row.blocked_until,
            status: parse_status(&row.status)?,
            price: row.price,
            bonus_points_used: row.bonus_points_used,
            bonus_points_earned: row.bonus_points_earned,
            discount: row.discount,
            notes: row.notes,
            cancellation_reason: row.cancellation_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<DbAppointmentHistory> for AppointmentHistoryEntry {
    type Error = SalonError;

    fn try_from(row: DbAppointmentHistory) -> Result<Self, Self::Error> {
        Ok(AppointmentHistoryEntry {
            id: row.id,
            appointment_id: row.appointment_id,
            from_status: row.from_status.as_deref().map(parse_status).transpose()?,
            to_status: parse_status(&row.to_status)?,
            previous_start: row.previous_start,
            previous_end: row.previous_end,
            actor_id: row.actor_id,
            note: row.note,
            recorded_at: row.recorded_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};
    use pretty_assertions::assert_eq;

    fn appointment_row(status: &str) -> DbAppointment {
        let start = Utc.with_ymd_and_hms(2030, 1, 7, 10, 0, 0).unwrap();
        DbAppointment {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            master_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            start_time: start,
            end_time: start + chrono::Duration::hours(1),
            blocked_until: start + chrono::Duration::hours(1),
            status: status.to_string(),
            price: 2500,
            bonus_points_used: 0,
            bonus_points_earned: 0,
            discount: 0,
            notes: None,
            cancellation_reason: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn appointment_row_converts() {
        let appointment = Appointment::try_from(appointment_row("rescheduled")).unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Rescheduled);
        assert_eq!(appointment.price, 2500);
    }

    #[test]
    fn unknown_status_is_a_database_error() {
        let err = Appointment::try_from(appointment_row("noshow")).unwrap_err();
        assert!(matches!(err, SalonError::Database(_)));
    }

    #[test]
    fn weekday_column_maps_to_weekday() {
        let row = DbWorkSchedule {
            id: Uuid::new_v4(),
            master_id: Uuid::new_v4(),
            day_of_week: 7,
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            is_active: true,
        };
        assert_eq!(WorkSchedule::try_from(row.clone()).unwrap().day_of_week, Weekday::Sun);

        let broken = DbWorkSchedule {
            day_of_week: 9,
            ..row
        };
        assert!(matches!(
            WorkSchedule::try_from(broken),
            Err(SalonError::Database(_))
        ));
    }
}
