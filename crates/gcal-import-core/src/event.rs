//! Event record types.
//!
//! This module provides the types read from the import file:
//! - [`EventList`]: The top-level document (`{"events": [...]}`)
//! - [`EventRecord`]: One user-supplied event description
//! - [`Reminder`]: An optional reminder override for a record
//!
//! Records keep their date and time fields as text. Format checks happen when
//! a record is turned into a request body (see [`crate::request`]), so a bad
//! date only fails that one record.

use serde::{Deserialize, Deserializer, Serialize};

/// A reminder attached to an event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Reminder method tag, e.g. `popup` or `email`.
    pub method: String,
    /// Minutes before the event start at which the reminder fires.
    ///
    /// Whole-number floats such as `10.0` are accepted.
    #[serde(deserialize_with = "whole_minutes")]
    pub minutes: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMinutes {
    Int(u32),
    Float(f64),
}

fn whole_minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match RawMinutes::deserialize(deserializer)? {
        RawMinutes::Int(minutes) => Ok(minutes),
        RawMinutes::Float(value) => whole_u32(value)
            .ok_or_else(|| serde::de::Error::custom("minutes must be a whole number of minutes")),
    }
}

/// Converts a float with no fractional part that fits in `u32`.
pub(crate) fn whole_u32(value: f64) -> Option<u32> {
    (value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value)).then_some(value as u32)
}

impl Reminder {
    /// Creates a new reminder.
    pub fn new(method: impl Into<String>, minutes: u32) -> Self {
        Self {
            method: method.into(),
            minutes,
        }
    }
}

/// One event description from the import file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event date in `YYYY-MM-DD` format.
    pub date: String,

    /// Start time in `HH:MM` (24-hour) format.
    #[serde(default)]
    pub start_time: Option<String>,

    /// End time in `HH:MM` (24-hour) format.
    #[serde(default)]
    pub end_time: Option<String>,

    /// Event title.
    pub summary: String,

    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,

    /// Event location.
    #[serde(default)]
    pub location: Option<String>,

    /// Reminder override. Older files spell the key `reminders`.
    #[serde(default, alias = "reminders")]
    pub reminder: Option<Reminder>,
}

impl EventRecord {
    /// Creates a record with only the required fields set.
    pub fn new(date: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            start_time: None,
            end_time: None,
            summary: summary.into(),
            description: None,
            location: None,
            reminder: None,
        }
    }

    /// Builder method to set start and end times.
    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self.end_time = Some(end.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set a reminder.
    pub fn with_reminder(mut self, reminder: Reminder) -> Self {
        self.reminder = Some(reminder);
        self
    }

    /// The start time, with blank strings treated as absent.
    pub fn start(&self) -> Option<&str> {
        non_blank(self.start_time.as_deref())
    }

    /// The end time, with blank strings treated as absent.
    pub fn end(&self) -> Option<&str> {
        non_blank(self.end_time.as_deref())
    }

    /// Returns true when neither a start nor an end time was given.
    pub fn is_all_day(&self) -> bool {
        self.start().is_none() && self.end().is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// The import document: an ordered list of event records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventList {
    /// Records in submission order.
    pub events: Vec<EventRecord>,
}

impl EventList {
    /// Number of records in the list.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the list has no records.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
