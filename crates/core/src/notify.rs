use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Created,
    Confirmed,
    Cancelled,
    Rescheduled,
    Completed,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationKind::Created => "created",
            NotificationKind::Confirmed => "confirmed",
            NotificationKind::Cancelled => "cancelled",
            NotificationKind::Rescheduled => "rescheduled",
            NotificationKind::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// A lifecycle event for the messaging side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub appointment_id: Uuid,
    pub kind: NotificationKind,
    pub recipient_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Fire-and-forget delivery of lifecycle events.
///
/// `dispatch` must return without waiting on the network. Delivery failures
/// are the implementation's to log; they never reach the booking flow.
pub trait Notifier: Send + Sync {
    fn dispatch(&self, notification: Notification);
}

/// Notifier that only records events in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn dispatch(&self, notification: Notification) {
        tracing::info!(
            appointment_id = %notification.appointment_id,
            recipient_id = %notification.recipient_id,
            kind = %notification.kind,
            "Notification (delivery disabled)"
        );
    }
}
