use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{SalonError, SalonResult};

/// Weekly opening hours of one master for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSchedule {
    pub master_id: Uuid,
    pub day_of_week: Weekday,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub is_active: bool,
}

impl WorkSchedule {
    pub fn new(
        master_id: Uuid,
        day_of_week: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> SalonResult<Self> {
        let schedule = Self {
            master_id,
            day_of_week,
            start_time,
            end_time,
            is_active: true,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> SalonResult<()> {
        if self.start_time >= self.end_time {
            return Err(SalonError::Validation(format!(
                "Work schedule for {} must start before it ends ({} >= {})",
                self.day_of_week,
                self.start_time.format("%H:%M"),
                self.end_time.format("%H:%M"),
            )));
        }
        Ok(())
    }
}

/// A per-date override of the weekly schedule (holiday, shortened day, etc).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleException {
    pub master_id: Uuid,
    pub date: NaiveDate,
    pub is_day_off: bool,
    #[serde(default, with = "hhmm::option")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm::option")]
    pub end_time: Option<NaiveTime>,
}

impl ScheduleException {
    pub fn validate(&self) -> SalonResult<()> {
        if self.is_day_off {
            return Ok(());
        }
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if start < end => Ok(()),
            (Some(_), Some(_)) => Err(SalonError::Validation(format!(
                "Exception on {} must start before it ends",
                self.date
            ))),
            _ => Err(SalonError::Validation(format!(
                "Exception on {} needs both start and end time unless it is a day off",
                self.date
            ))),
        }
    }
}

/// The bookable range of a master on one calendar date, in absolute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WorkingWindow {
    pub fn contains(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start <= start && end <= self.end
    }
}

/// Resolves the working window for `date` in the salon time zone.
///
/// An exception for the date wins over the weekday row. Returns `None` when
/// the master does not work that day.
pub fn resolve_window(
    weekly: Option<&WorkSchedule>,
    exception: Option<&ScheduleException>,
    date: NaiveDate,
    tz: Tz,
) -> Option<WorkingWindow> {
    let (open, close) = match exception {
        Some(ex) if ex.is_day_off => return None,
        Some(ex) => (ex.start_time?, ex.end_time?),
        None => {
            let row = weekly?;
            if !row.is_active || row.day_of_week != date.weekday() {
                return None;
            }
            (row.start_time, row.end_time)
        }
    };

    let start = local_to_utc(tz, date, open)?;
    let end = local_to_utc(tz, date, close)?;
    (start < end).then_some(WorkingWindow { start, end })
}

/// Interprets a wall-clock time on `date` in `tz`.
pub fn local_to_utc(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Calendar date of an instant in the salon time zone.
pub fn local_date(tz: Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// ISO weekday number, Monday = 1.
pub fn weekday_number(day: Weekday) -> i16 {
    day.number_from_monday() as i16
}

pub fn weekday_from_number(n: i16) -> SalonResult<Weekday> {
    match n {
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        7 => Ok(Weekday::Sun),
        other => Err(SalonError::Validation(format!("Invalid day of week {}", other))),
    }
}

/// `HH:mm` (de)serialization for wall-clock times.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Accepts `HH:mm` and `HH:mm:ss`.
    pub fn parse(raw: &str) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| format!("Invalid time '{}', expected HH:mm", raw))
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
