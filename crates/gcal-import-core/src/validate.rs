//! Schema validation for import files.
//!
//! The import file must be a JSON object with an `events` array whose
//! elements look like [`EventRecord`](crate::event::EventRecord). Validation
//! walks the raw [`serde_json::Value`] so that every problem in the file is
//! reported with a field path, instead of stopping at the first serde error.
//!
//! Date and time text is not checked here; that happens per record when the
//! request body is built.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::event::{EventList, whole_u32};

/// Path used for issues that concern the document as a whole.
pub const ROOT_PATH: &str = "$";

/// Optional text fields of an event record.
const OPTIONAL_TEXT_FIELDS: [&str; 4] = ["start_time", "end_time", "description", "location"];

/// Why a field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// A required field is absent.
    Missing,
    /// The field has the wrong JSON type.
    WrongType {
        /// The JSON type that was expected.
        expected: &'static str,
        /// The JSON type that was found.
        found: &'static str,
    },
    /// The value has the right type but is outside the accepted range.
    OutOfRange(String),
    /// Two keys that mean the same thing were both given.
    Conflict {
        /// The other key.
        other: String,
    },
    /// The input is not valid JSON.
    MalformedJson(String),
    /// Any other structural problem.
    Invalid(String),
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "field required"),
            Self::WrongType { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            Self::OutOfRange(reason) => write!(f, "{}", reason),
            Self::Conflict { other } => write!(f, "conflicts with `{}`", other),
            Self::MalformedJson(message) => write!(f, "malformed JSON: {}", message),
            Self::Invalid(message) => write!(f, "{}", message),
        }
    }
}

/// A single validation problem at a field path such as `events[2].summary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Location of the offending field.
    pub path: String,
    /// What is wrong with it.
    pub kind: IssueKind,
}

impl FieldIssue {
    /// Creates a new issue.
    pub fn new(path: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    fn wrong_type(path: impl Into<String>, expected: &'static str, found: &Value) -> Self {
        Self::new(
            path,
            IssueKind::WrongType {
                expected,
                found: json_type_name(found),
            },
        )
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// The import file does not match the event-list schema.
///
/// Holds every issue found in the file, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Creates an error from a non-empty list of issues.
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    fn single(issue: FieldIssue) -> Self {
        Self::new(vec![issue])
    }

    /// Returns the individual issues.
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Returns true if any issue is reported at the given path.
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.issues.len();
        write!(
            f,
            "{} validation error{} for event list",
            count,
            if count == 1 { "" } else { "s" }
        )?;
        for issue in &self.issues {
            write!(f, "\n  {}", issue)?;
        }
        Ok(())
    }
}

/// Parses and validates the text of an import file.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the text is not JSON or does not match
/// the event-list schema.
pub fn parse_event_list(text: &str) -> Result<EventList, ValidationError> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        ValidationError::single(FieldIssue::new(
            ROOT_PATH,
            IssueKind::MalformedJson(e.to_string()),
        ))
    })?;
    validate_event_list(&value)
}

/// Validates an already-parsed JSON document and converts it to an [`EventList`].
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every schema violation found.
pub fn validate_event_list(value: &Value) -> Result<EventList, ValidationError> {
    let Some(root) = value.as_object() else {
        return Err(ValidationError::single(FieldIssue::wrong_type(
            ROOT_PATH, "object", value,
        )));
    };

    let mut issues = Vec::new();
    match root.get("events") {
        None => issues.push(FieldIssue::new("events", IssueKind::Missing)),
        Some(Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                check_record(&format!("events[{}]", index), item, &mut issues);
            }
        }
        Some(other) => issues.push(FieldIssue::wrong_type("events", "array", other)),
    }

    if !issues.is_empty() {
        debug!("input failed validation with {} issue(s)", issues.len());
        return Err(ValidationError::new(issues));
    }

    let list: EventList = serde_json::from_value(value.clone()).map_err(|e| {
        ValidationError::single(FieldIssue::new(ROOT_PATH, IssueKind::Invalid(e.to_string())))
    })?;
    debug!("validated {} event record(s)", list.len());
    Ok(list)
}

fn check_record(path: &str, item: &Value, issues: &mut Vec<FieldIssue>) {
    let Some(record) = item.as_object() else {
        issues.push(FieldIssue::wrong_type(path, "object", item));
        return;
    };

    require_string(record, path, "date", issues);
    require_string(record, path, "summary", issues);
    for key in OPTIONAL_TEXT_FIELDS {
        optional_string(record, path, key, issues);
    }

    match (record.get("reminder"), record.get("reminders")) {
        (Some(_), Some(_)) => issues.push(FieldIssue::new(
            field_path(path, "reminders"),
            IssueKind::Conflict {
                other: "reminder".to_string(),
            },
        )),
        (Some(value), None) => check_reminder(&field_path(path, "reminder"), value, issues),
        (None, Some(value)) => check_reminder(&field_path(path, "reminders"), value, issues),
        (None, None) => {}
    }
}

fn check_reminder(path: &str, value: &Value, issues: &mut Vec<FieldIssue>) {
    let reminder = match value {
        Value::Null => return,
        Value::Object(reminder) => reminder,
        other => {
            issues.push(FieldIssue::wrong_type(path, "object", other));
            return;
        }
    };

    require_string(reminder, path, "method", issues);

    let minutes_path = field_path(path, "minutes");
    match reminder.get("minutes") {
        None => issues.push(FieldIssue::new(minutes_path, IssueKind::Missing)),
        Some(Value::Number(n)) => {
            if let Some(minutes) = n.as_u64() {
                if u32::try_from(minutes).is_err() {
                    issues.push(FieldIssue::new(
                        minutes_path,
                        IssueKind::OutOfRange(format!("{} is too large", minutes)),
                    ));
                }
            } else if n.as_i64().is_some() {
                issues.push(FieldIssue::new(
                    minutes_path,
                    IssueKind::OutOfRange("must be a non-negative integer".to_string()),
                ));
            } else if n.as_f64().and_then(whole_u32).is_none() {
                issues.push(FieldIssue::new(
                    minutes_path,
                    IssueKind::WrongType {
                        expected: "integer",
                        found: "number",
                    },
                ));
            }
        }
        Some(other) => issues.push(FieldIssue::wrong_type(minutes_path, "integer", other)),
    }
}

fn require_string(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    issues: &mut Vec<FieldIssue>,
) {
    match object.get(key) {
        None => issues.push(FieldIssue::new(field_path(path, key), IssueKind::Missing)),
        Some(Value::String(_)) => {}
        Some(other) => issues.push(FieldIssue::wrong_type(field_path(path, key), "string", other)),
    }
}

fn optional_string(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    issues: &mut Vec<FieldIssue>,
) {
    match object.get(key) {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(other) => issues.push(FieldIssue::wrong_type(field_path(path, key), "string", other)),
    }
}

fn field_path(parent: &str, key: &str) -> String {
    format!("{}.{}", parent, key)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventRecord, Reminder};

    #[test]
    fn valid_minimal_list() {
        let list =
            parse_event_list(r#"{"events":[{"date":"2024-06-01","summary":"Standup"}]}"#).unwrap();
        assert_eq!(list.events, vec![EventRecord::new("2024-06-01", "Standup")]);
    }

    #[test]
    fn missing_date_fails() {
        let err = parse_event_list(r#"{"events":[{"summary":"X"}]}"#).unwrap_err();
        assert_eq!(
            err.issues(),
            &[FieldIssue::new("events[0].date", IssueKind::Missing)]
        );
    }

    #[test]
    fn missing_summary_fails() {
        let err = parse_event_list(r#"{"events":[{"date":"2024-06-01"}]}"#).unwrap_err();
        assert!(err.has_issue_at("events[0].summary"));
        assert_eq!(err.issues().len(), 1);
    }

    #[test]
    fn collects_issues_across_records() {
        let json = r#"{"events":[
            {"date":"2024-06-01","summary":"ok"},
            {"summary": 42},
            "not an object"
        ]}"#;
        let err = parse_event_list(json).unwrap_err();
        assert_eq!(
            err.issues(),
            &[
                FieldIssue::new(
                    "events[1].date",
                    IssueKind::Missing
                ),
                FieldIssue::new(
                    "events[1].summary",
                    IssueKind::WrongType {
                        expected: "string",
                        found: "number"
                    }
                ),
                FieldIssue::new(
                    "events[2]",
                    IssueKind::WrongType {
                        expected: "object",
                        found: "string"
                    }
                ),
            ]
        );
    }

    #[test]
    fn null_required_field_is_wrong_type() {
        let err = parse_event_list(r#"{"events":[{"date":null,"summary":"X"}]}"#).unwrap_err();
        assert_eq!(
            err.issues()[0].kind,
            IssueKind::WrongType {
                expected: "string",
                found: "null"
            }
        );
    }

    #[test]
    fn optional_fields_wrong_type() {
        let json = r#"{"events":[{"date":"2024-06-01","summary":"X","location":["a"],"start_time":900}]}"#;
        let err = parse_event_list(json).unwrap_err();
        assert!(err.has_issue_at("events[0].start_time"));
        assert!(err.has_issue_at("events[0].location"));
    }

    #[test]
    fn missing_events_key() {
        let err = parse_event_list(r#"{"items": []}"#).unwrap_err();
        assert_eq!(err.issues(), &[FieldIssue::new("events", IssueKind::Missing)]);
    }

    #[test]
    fn events_not_an_array() {
        let err = parse_event_list(r#"{"events": {}}"#).unwrap_err();
        assert_eq!(
            err.issues()[0].kind,
            IssueKind::WrongType {
                expected: "array",
                found: "object"
            }
        );
    }

    #[test]
    fn root_not_an_object() {
        let err = parse_event_list("[]").unwrap_err();
        assert!(err.has_issue_at(ROOT_PATH));
    }

    #[test]
    fn malformed_json() {
        let err = parse_event_list(r#"{"events": [}"#).unwrap_err();
        assert!(matches!(err.issues()[0].kind, IssueKind::MalformedJson(_)));
        assert!(err.issues()[0].to_string().contains("line 1"));
    }

    #[test]
    fn date_format_is_not_checked() {
        let list =
            parse_event_list(r#"{"events":[{"date":"next tuesday","summary":"X"}]}"#).unwrap();
        assert_eq!(list.events[0].date, "next tuesday");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let json = r#"{"version": 2, "events":[{"date":"2024-06-01","summary":"X","color":"red"}]}"#;
        assert!(parse_event_list(json).is_ok());
    }

    #[test]
    fn reminder_is_validated() {
        let json = r#"{"events":[
            {"date":"2024-06-01","summary":"a","reminder":{"minutes":-5}},
            {"date":"2024-06-01","summary":"b","reminder":{"method":"popup","minutes":1.5}},
            {"date":"2024-06-01","summary":"c","reminders":{"method":"popup"}},
            {"date":"2024-06-01","summary":"d","reminder":"popup"}
        ]}"#;
        let err = parse_event_list(json).unwrap_err();
        assert!(err.has_issue_at("events[0].reminder.method"));
        assert_eq!(
            err.issues()[1],
            FieldIssue::new(
                "events[0].reminder.minutes",
                IssueKind::OutOfRange("must be a non-negative integer".to_string())
            )
        );
        assert!(err.has_issue_at("events[1].reminder.minutes"));
        assert!(err.has_issue_at("events[2].reminders.minutes"));
        assert!(err.has_issue_at("events[3].reminder"));
    }

    #[test]
    fn reminder_and_reminders_conflict() {
        let json = r#"{"events":[{"date":"2024-06-01","summary":"X",
            "reminder":{"method":"popup","minutes":5},
            "reminders":{"method":"email","minutes":10}}]}"#;
        let err = parse_event_list(json).unwrap_err();
        assert_eq!(
            err.issues(),
            &[FieldIssue::new(
                "events[0].reminders",
                IssueKind::Conflict {
                    other: "reminder".to_string()
                }
            )]
        );
    }

    #[test]
    fn whole_float_minutes_are_accepted() {
        let json = r#"{"events":[{"date":"2024-06-01","summary":"X","reminder":{"method":"popup","minutes":10.0}}]}"#;
        let list = parse_event_list(json).unwrap();
        assert_eq!(list.events[0].reminder, Some(Reminder::new("popup", 10)));
    }

    #[test]
    fn valid_reminder() {
        let json = r#"{"events":[{"date":"2024-06-01","summary":"X","reminders":{"method":"popup","minutes":0}}]}"#;
        let list = parse_event_list(json).unwrap();
        assert_eq!(list.events[0].reminder, Some(Reminder::new("popup", 0)));
    }

    #[test]
    fn error_display_lists_every_issue() {
        let err = parse_event_list(r#"{"events":[{}]}"#).unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("2 validation errors for event list"));
        assert!(text.contains("events[0].date: field required"));
        assert!(text.contains("events[0].summary: field required"));
    }
}
