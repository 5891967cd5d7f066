//! CalendarInserter trait definition.
//!
//! This module defines the [`CalendarInserter`] trait, the narrow contract
//! between the import loop and a calendar backend: insert one event body
//! into one calendar and report where it ended up.

use std::future::Future;
use std::pin::Pin;

use gcal_import_core::EventRequest;

use crate::error::ProviderResult;

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so the import loop can take a
/// `&dyn CalendarInserter`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An event as created by the calendar backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    /// Backend-assigned event identifier.
    pub id: Option<String>,
    /// User-facing link to the event in the calendar UI.
    pub html_link: Option<String>,
}

impl CreatedEvent {
    /// Creates a new created-event record.
    pub fn new(id: Option<String>, html_link: Option<String>) -> Self {
        Self { id, html_link }
    }

    /// Returns the user-facing link, or a placeholder if the backend gave none.
    pub fn link(&self) -> &str {
        self.html_link.as_deref().unwrap_or("(no link returned)")
    }
}

/// Inserts events into a calendar.
///
/// Implementations make exactly one remote call per invocation: no retries,
/// no deduplication. Inserting the same body twice creates two events.
///
/// # Example Implementation
///
/// ```ignore
/// impl CalendarInserter for GoogleCalendarClient {
///     fn name(&self) -> &str { "google" }
///
///     fn insert_event<'a>(
///         &'a self,
///         calendar_id: &'a str,
///         request: &'a EventRequest,
///     ) -> BoxFuture<'a, ProviderResult<CreatedEvent>> {
///         Box::pin(async move { self.insert(calendar_id, request).await })
///     }
/// }
/// ```
pub trait CalendarInserter: Send + Sync {
    /// Returns the name/type of this backend (e.g., "google").
    fn name(&self) -> &str;

    /// Inserts one event into the given calendar.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on network errors, authentication failures,
    /// or when the backend rejects the event.
    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        request: &'a EventRequest,
    ) -> BoxFuture<'a, ProviderResult<CreatedEvent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_event_link() {
        let event = CreatedEvent::new(
            Some("abc123".to_string()),
            Some("https://www.google.com/calendar/event?eid=abc123".to_string()),
        );
        assert_eq!(
            event.link(),
            "https://www.google.com/calendar/event?eid=abc123"
        );
    }

    #[test]
    fn created_event_without_link() {
        let event = CreatedEvent::new(Some("abc123".to_string()), None);
        assert_eq!(event.link(), "(no link returned)");
    }
}
