//! Request bodies for the Calendar API `events.insert` call.
//!
//! [`to_request`] turns one [`EventRecord`] into an [`EventRequest`]:
//!
//! - Records with both `start_time` and `end_time` become timed events on
//!   `date` in the target zone.
//! - Records with neither become a span from `00:00:00` to `23:59:59` on
//!   `date`. Blank strings count as absent.
//! - Records with only one of the two are rejected with
//!   [`TransformError::IncompleteTimeRange`].
//!
//! Timestamps are sent as local wall-clock times together with an IANA zone
//! name, so no offset arithmetic happens here.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{EventRecord, Reminder};

/// The zone every imported event is created in.
pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::America::Los_Angeles;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// Errors raised while building a request body from a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// `date` is not a `YYYY-MM-DD` calendar date.
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    /// A time field is not `HH:MM` or `HH:MM:SS`.
    #[error("invalid {field} '{value}': expected HH:MM")]
    InvalidTime { field: &'static str, value: String },

    /// Only one of `start_time` / `end_time` was given.
    #[error("{present} is set but {missing} is not; give both or neither")]
    IncompleteTimeRange {
        present: &'static str,
        missing: &'static str,
    },
}

/// Start or end of an event: a local timestamp plus its zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// Wall-clock time in `time_zone`, serialized as `YYYY-MM-DDTHH:MM:SS`.
    pub date_time: NaiveDateTime,
    /// IANA zone identifier.
    pub time_zone: String,
}

impl EventDateTime {
    /// Creates a timestamp in the given zone.
    pub fn new(date_time: NaiveDateTime, tz: Tz) -> Self {
        Self {
            date_time,
            time_zone: tz.name().to_string(),
        }
    }
}

/// A single reminder override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

impl From<&Reminder> for ReminderOverride {
    fn from(reminder: &Reminder) -> Self {
        Self {
            method: reminder.method.clone(),
            minutes: reminder.minutes,
        }
    }
}

/// Reminder settings of a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    /// Whether the calendar's default reminders apply.
    pub use_default: bool,
    /// Explicit reminders, only sent when `use_default` is false.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<ReminderOverride>,
}

impl ReminderSettings {
    /// Use the calendar's default reminders.
    pub fn calendar_default() -> Self {
        Self {
            use_default: true,
            overrides: Vec::new(),
        }
    }

    /// Replace the defaults with exactly one reminder.
    pub fn single(reminder: &Reminder) -> Self {
        Self {
            use_default: false,
            overrides: vec![ReminderOverride::from(reminder)],
        }
    }
}

/// Body of an `events.insert` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub reminders: ReminderSettings,
}

/// Builds the request body for one record in the given zone.
///
/// # Errors
///
/// Returns a [`TransformError`] if the date or a time cannot be parsed, or
/// if only one of `start_time` / `end_time` is present.
pub fn to_request(record: &EventRecord, tz: Tz) -> Result<EventRequest, TransformError> {
    let date = parse_date(&record.date)?;

    let (start, end) = if record.is_all_day() {
        (date.and_time(NaiveTime::MIN), date.and_time(end_of_day()))
    } else {
        match (record.start(), record.end()) {
            (Some(start), Some(end)) => (
                date.and_time(parse_time("start_time", start)?),
                date.and_time(parse_time("end_time", end)?),
            ),
            (Some(_), None) => {
                return Err(TransformError::IncompleteTimeRange {
                    present: "start_time",
                    missing: "end_time",
                });
            }
            _ => {
                return Err(TransformError::IncompleteTimeRange {
                    present: "end_time",
                    missing: "start_time",
                });
            }
        }
    };

    let reminders = match &record.reminder {
        Some(reminder) => ReminderSettings::single(reminder),
        None => ReminderSettings::calendar_default(),
    };

    Ok(EventRequest {
        summary: record.summary.clone(),
        description: record.description.clone(),
        location: record.location.clone(),
        start: EventDateTime::new(start, tz),
        end: EventDateTime::new(end, tz),
        reminders,
    })
}

/// Builds one result per record, in input order.
pub fn to_requests(
    records: &[EventRecord],
    tz: Tz,
) -> Vec<Result<EventRequest, TransformError>> {
    records.iter().map(|record| to_request(record, tz)).collect()
}

fn parse_date(value: &str) -> Result<NaiveDate, TransformError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        TransformError::InvalidDate {
            value: value.to_string(),
        }
    })
}

/// Parses `HH:MM` or `HH:MM:SS`.
///
/// Single-digit hours (`9:00`) are accepted. Leap seconds (`23:59:60`) are
/// not: chrono parses them, but the Calendar API has no use for them.
fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, TransformError> {
    let trimmed = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        .filter(|time| time.nanosecond() < 1_000_000_000)
        .ok_or_else(|| TransformError::InvalidTime {
            field,
            value: value.to_string(),
        })
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).expect("valid time")
}
