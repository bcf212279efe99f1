use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::SalonError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Rescheduled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Rescheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Rescheduled => "rescheduled",
        }
    }

    /// Whether an appointment in this status holds its time range.
    ///
    /// Everything except `cancelled` occupies the slot, `rescheduled` included.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = SalonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| SalonError::Validation(format!("Unknown appointment status '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// `end_time` plus the master's break at booking time; the range other
    /// bookings may not intrude on.
    pub blocked_until: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub price: i64,
    pub bonus_points_used: i32,
    pub bonus_points_earned: i32,
    pub discount: i64,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Service duration snapshotted when the appointment was booked.
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Rest padding snapshotted when the appointment was booked.
    pub fn break_padding(&self) -> Duration {
        self.blocked_until - self.end_time
    }
}

/// Row to insert for a fresh booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub blocked_until: DateTime<Utc>,
    pub price: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewAppointment {
    pub fn into_appointment(self) -> Appointment {
        Appointment {
            id: self.id,
            client_id: self.client_id,
            master_id: self.master_id,
            service_id: self.service_id,
            start_time: self.start_time,
            end_time: self.end_time,
            blocked_until: self.blocked_until,
            status: AppointmentStatus::Pending,
            price: self.price,
            bonus_points_used: 0,
            bonus_points_earned: 0,
            discount: 0,
            notes: self.notes,
            cancellation_reason: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// One append-only record of a lifecycle mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentHistoryEntry {
    pub id: Uuid,
    pub appointment_id: Uuid,
    /// `None` for the entry written at creation.
    pub from_status: Option<AppointmentStatus>,
    pub to_status: AppointmentStatus,
    pub previous_start: Option<DateTime<Utc>>,
    pub previous_end: Option<DateTime<Utc>>,
    pub actor_id: Option<Uuid>,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// New time range for a reschedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTimes {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub blocked_until: DateTime<Utc>,
}

// ── API request/response types ──

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelAppointmentRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleAppointmentRequest {
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsQuery {
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterAppointmentsQuery {
    pub master_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}
