//! Allowed appointment status transitions.
//!
//! ```text
//! pending     -> confirmed | cancelled | rescheduled
//! confirmed   -> completed | cancelled | rescheduled
//! rescheduled -> confirmed | cancelled | rescheduled
//! completed, cancelled: terminal
//! ```

use crate::errors::{SalonError, SalonResult};
use crate::models::appointment::AppointmentStatus;

pub fn valid_transitions(current: AppointmentStatus) -> &'static [AppointmentStatus] {
    use AppointmentStatus::*;
    match current {
        Pending => &[Confirmed, Cancelled, Rescheduled],
        Confirmed => &[Completed, Cancelled, Rescheduled],
        Rescheduled => &[Confirmed, Cancelled, Rescheduled],
        Completed | Cancelled => &[],
    }
}

pub fn can_transition(current: AppointmentStatus, next: AppointmentStatus) -> bool {
    valid_transitions(current).contains(&next)
}

pub fn ensure_transition(current: AppointmentStatus, next: AppointmentStatus) -> SalonResult<()> {
    if can_transition(current, next) {
        return Ok(());
    }
    tracing::warn!(from = %current, to = %next, "Rejected appointment status transition");
    let message = if current.is_terminal() {
        format!("Appointment is already {}", current)
    } else {
        format!("Cannot move appointment from {} to {}", current, next)
    };
    Err(SalonError::Conflict(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    #[test]
    fn terminal_states_have_no_exits() {
        for next in AppointmentStatus::ALL {
            assert!(!can_transition(Cancelled, next));
            assert!(!can_transition(Completed, next));
        }
    }

    #[test]
    fn completion_requires_confirmation() {
        assert!(!can_transition(Pending, Completed));
        assert!(!can_transition(Rescheduled, Completed));
        assert!(can_transition(Confirmed, Completed));
    }

    #[test]
    fn rejected_transition_is_a_conflict() {
        let err = ensure_transition(Cancelled, Cancelled).unwrap_err();
        assert!(matches!(err, SalonError::Conflict(msg) if msg.contains("already cancelled")));
    }
}
