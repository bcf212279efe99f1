use chrono::{NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use pretty_assertions::assert_eq;
use rstest::rstest;
use salon_core::errors::SalonError;
use salon_core::models::{
    actor::{Actor, ActorRole},
    appointment::{AppointmentStatus, CancelAppointmentRequest, CreateAppointmentRequest},
    work_schedule::{
        ScheduleException, WorkSchedule, resolve_window, weekday_from_number, weekday_number,
    },
};
use serde_json::{from_str, json, to_value};
use uuid::Uuid;

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[rstest]
#[case("pending", AppointmentStatus::Pending)]
#[case("confirmed", AppointmentStatus::Confirmed)]
#[case("completed", AppointmentStatus::Completed)]
#[case("cancelled", AppointmentStatus::Cancelled)]
#[case("rescheduled", AppointmentStatus::Rescheduled)]
fn test_status_parses_its_own_name(#[case] raw: &str, #[case] expected: AppointmentStatus) {
    let parsed: AppointmentStatus = raw.parse().expect("known status");
    assert_eq!(parsed, expected);
    assert_eq!(parsed.to_string(), raw);
}

#[test]
fn test_unknown_status_is_a_validation_error() {
    let err = "noshow".parse::<AppointmentStatus>().unwrap_err();
    assert!(matches!(err, SalonError::Validation(_)));
}

#[test]
fn test_rescheduled_still_occupies_its_slot() {
    assert!(AppointmentStatus::Rescheduled.occupies_slot());
    assert!(AppointmentStatus::Pending.occupies_slot());
    assert!(!AppointmentStatus::Cancelled.occupies_slot());
}

#[test]
fn test_work_schedule_requires_start_before_end() {
    let master_id = Uuid::new_v4();
    assert!(WorkSchedule::new(master_id, Weekday::Mon, hm(9, 0), hm(18, 0)).is_ok());

    let err = WorkSchedule::new(master_id, Weekday::Mon, hm(18, 0), hm(9, 0)).unwrap_err();
    assert!(matches!(err, SalonError::Validation(_)));

    let err = WorkSchedule::new(master_id, Weekday::Mon, hm(9, 0), hm(9, 0)).unwrap_err();
    assert!(matches!(err, SalonError::Validation(_)));
}

#[test]
fn test_work_schedule_json_uses_hh_mm() {
    let master_id = Uuid::new_v4();
    let row = WorkSchedule::new(master_id, Weekday::Tue, hm(9, 30), hm(17, 0)).unwrap();

    let value = to_value(&row).unwrap();
    assert_eq!(value["startTime"], json!("09:30"));
    assert_eq!(value["endTime"], json!("17:00"));
    assert_eq!(value["dayOfWeek"], json!("Tue"));

    let back: WorkSchedule = serde_json::from_value(value).unwrap();
    assert_eq!(back, row);
}

#[test]
fn test_exception_day_off_needs_no_hours() {
    let exception: ScheduleException = from_str(&format!(
        r#"{{"masterId":"{}","date":"2030-01-01","isDayOff":true}}"#,
        Uuid::new_v4()
    ))
    .unwrap();

    assert!(exception.validate().is_ok());
    assert_eq!(exception.start_time, None);
}

#[test]
fn test_exception_with_hours_must_have_both_ends() {
    let exception = ScheduleException {
        master_id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        is_day_off: false,
        start_time: Some(hm(10, 0)),
        end_time: None,
    };
    assert!(matches!(
        exception.validate(),
        Err(SalonError::Validation(_))
    ));
}

#[rstest]
#[case(Weekday::Mon, 1)]
#[case(Weekday::Sun, 7)]
fn test_weekday_numbers(#[case] day: Weekday, #[case] n: i16) {
    assert_eq!(weekday_number(day), n);
    assert_eq!(weekday_from_number(n).unwrap(), day);
}

#[test]
fn test_weekday_out_of_range() {
    assert!(weekday_from_number(0).is_err());
    assert!(weekday_from_number(8).is_err());
}

#[test]
fn test_window_is_read_in_salon_time_zone() {
    let master_id = Uuid::new_v4();
    // 2030-01-07 is a Monday.
    let date = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();
    let row = WorkSchedule::new(master_id, Weekday::Mon, hm(9, 0), hm(18, 0)).unwrap();

    let window = resolve_window(Some(&row), None, date, chrono_tz::Europe::Moscow).unwrap();

    // Moscow is UTC+3 all year.
    assert_eq!(window.start, Utc.with_ymd_and_hms(2030, 1, 7, 6, 0, 0).unwrap());
    assert_eq!(window.end, Utc.with_ymd_and_hms(2030, 1, 7, 15, 0, 0).unwrap());
}

#[test]
fn test_window_ignores_row_for_other_weekday_or_inactive() {
    let master_id = Uuid::new_v4();
    let monday = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();
    let tuesday_row = WorkSchedule::new(master_id, Weekday::Tue, hm(9, 0), hm(18, 0)).unwrap();
    assert!(resolve_window(Some(&tuesday_row), None, monday, chrono_tz::UTC).is_none());

    let mut monday_row = WorkSchedule::new(master_id, Weekday::Mon, hm(9, 0), hm(18, 0)).unwrap();
    monday_row.is_active = false;
    assert!(resolve_window(Some(&monday_row), None, monday, chrono_tz::UTC).is_none());
}

#[test]
fn test_exception_overrides_weekly_row() {
    let master_id = Uuid::new_v4();
    let monday = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();
    let row = WorkSchedule::new(master_id, Weekday::Mon, hm(9, 0), hm(18, 0)).unwrap();

    let day_off = ScheduleException {
        master_id,
        date: monday,
        is_day_off: true,
        start_time: None,
        end_time: None,
    };
    assert!(resolve_window(Some(&row), Some(&day_off), monday, chrono_tz::UTC).is_none());

    let short_day = ScheduleException {
        is_day_off: false,
        start_time: Some(hm(12, 0)),
        end_time: Some(hm(14, 0)),
        ..day_off
    };
    let window = resolve_window(Some(&row), Some(&short_day), monday, chrono_tz::UTC).unwrap();
    assert_eq!(window.start, Utc.with_ymd_and_hms(2030, 1, 7, 12, 0, 0).unwrap());
    assert_eq!(window.end, Utc.with_ymd_and_hms(2030, 1, 7, 14, 0, 0).unwrap());
}

#[test]
fn test_actor_ownership() {
    let client_id = Uuid::new_v4();
    let owner = Actor::client(client_id);
    let stranger = Actor::client(Uuid::new_v4());
    let admin = Actor::admin(Uuid::new_v4());

    assert!(owner.may_act_for(client_id));
    assert!(!stranger.may_act_for(client_id));
    assert!(admin.may_act_for(client_id));
}

#[rstest]
#[case("admin", ActorRole::Admin)]
#[case("Client", ActorRole::Client)]
#[case(" admin ", ActorRole::Admin)]
fn test_actor_role_parsing(#[case] raw: &str, #[case] expected: ActorRole) {
    assert_eq!(raw.parse::<ActorRole>().unwrap(), expected);
}

#[test]
fn test_create_request_uses_camel_case() {
    let master_id = Uuid::new_v4();
    let service_id = Uuid::new_v4();
    let request: CreateAppointmentRequest = from_str(&format!(
        r#"{{"masterId":"{}","serviceId":"{}","startTime":"2030-01-07T10:00:00Z"}}"#,
        master_id, service_id
    ))
    .unwrap();

    assert_eq!(request.master_id, master_id);
    assert_eq!(request.service_id, service_id);
    assert_eq!(
        request.start_time,
        Utc.with_ymd_and_hms(2030, 1, 7, 10, 0, 0).unwrap()
    );
    assert_eq!(request.notes, None);
}

#[test]
fn test_cancel_request_reason_is_optional() {
    let empty: CancelAppointmentRequest = from_str("{}").unwrap();
    assert_eq!(empty.reason, None);

    let with_reason: CancelAppointmentRequest = from_str(r#"{"reason":"sick"}"#).unwrap();
    assert_eq!(with_reason.reason.as_deref(), Some("sick"));
}
