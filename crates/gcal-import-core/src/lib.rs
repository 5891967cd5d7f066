//! Core types: event records, schema validation, request bodies

pub mod event;
pub mod request;
pub mod tracing;
pub mod validate;

pub use event::{EventList, EventRecord, Reminder};
pub use request::{
    DEFAULT_TIME_ZONE, EventDateTime, EventRequest, ReminderOverride, ReminderSettings,
    TransformError, to_request, to_requests,
};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use validate::{FieldIssue, IssueKind, ValidationError, parse_event_list, validate_event_list};
