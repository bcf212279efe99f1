//! Message texts sent to clients and the admin chat.

use chrono_tz::Tz;
use salon_core::notify::{Notification, NotificationKind};

/// Escapes the characters Telegram's HTML parse mode treats specially.
pub fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn local_time(notification: &Notification, tz: Tz) -> String {
    notification
        .starts_at
        .with_timezone(&tz)
        .format("%d.%m.%Y %H:%M")
        .to_string()
}

/// Text for the client the appointment belongs to.
pub fn client_message(notification: &Notification, tz: Tz) -> String {
    let when = local_time(notification, tz);
    let mut text = match notification.kind {
        NotificationKind::Created => {
            format!("Your appointment on <b>{}</b> is booked and awaits confirmation.", when)
        }
        NotificationKind::Confirmed => {
            format!("Your appointment on <b>{}</b> is confirmed. See you!", when)
        }
        NotificationKind::Rescheduled => {
            format!("Your appointment has been moved to <b>{}</b>.", when)
        }
        NotificationKind::Cancelled => {
            format!("Your appointment on <b>{}</b> has been cancelled.", when)
        }
        NotificationKind::Completed => "Thank you for visiting us!".to_string(),
    };

    if let Some(reason) = &notification.reason {
        text.push_str(&format!("\nReason: {}", escape_html(reason)));
    }
    text
}

/// Text for the admin chat.
pub fn admin_message(notification: &Notification, tz: Tz) -> String {
    let mut text = format!(
        "Appointment <code>{}</code> {} ({})",
        notification.appointment_id,
        notification.kind,
        local_time(notification, tz)
    );
    if let Some(reason) = &notification.reason {
        text.push_str(&format!("\nReason: {}", escape_html(reason)));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn notification(kind: NotificationKind, reason: Option<&str>) -> Notification {
        Notification {
            appointment_id: Uuid::nil(),
            kind,
            recipient_id: Uuid::new_v4(),
            starts_at: Utc.with_ymd_and_hms(2030, 1, 7, 7, 0, 0).unwrap(),
            reason: reason.map(str::to_string),
        }
    }

    #[test]
    fn times_are_shown_in_salon_zone() {
        let text = client_message(
            &notification(NotificationKind::Confirmed, None),
            chrono_tz::Europe::Moscow,
        );
        assert_eq!(
            text,
            "Your appointment on <b>07.01.2030 10:00</b> is confirmed. See you!"
        );
    }

    #[test]
    fn reasons_are_escaped() {
        let text = client_message(
            &notification(NotificationKind::Cancelled, Some("<sick> & tired")),
            chrono_tz::UTC,
        );
        assert!(text.ends_with("Reason: &lt;sick&gt; &amp; tired"));
    }

    #[test]
    fn admin_message_names_the_event() {
        let text = admin_message(
            &notification(NotificationKind::Rescheduled, None),
            chrono_tz::UTC,
        );
        assert!(text.contains("rescheduled"));
        assert!(text.contains(&Uuid::nil().to_string()));
    }
}
