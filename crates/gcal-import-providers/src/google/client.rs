//! Google Calendar API client.
//!
//! Only `events.insert` is implemented: one POST per event, no retries.

use std::time::Duration;

use gcal_import_core::EventRequest;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, CalendarInserter, CreatedEvent};

/// Google Calendar API client bound to one access token.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GoogleCalendarClient {
    /// Creates a client for the API rooted at `base_url`.
    pub fn new(
        access_token: impl Into<String>,
        timeout: Duration,
        base_url: impl Into<String>,
    ) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            access_token: access_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    /// Inserts one event and returns what the API reported back.
    ///
    /// # Errors
    ///
    /// Transport failures map to `NetworkError`; non-2xx responses carry the
    /// HTTP status and Google's error message.
    pub async fn insert(
        &self,
        calendar_id: &str,
        request: &EventRequest,
    ) -> ProviderResult<CreatedEvent> {
        let url = self.events_url(calendar_id);
        debug!(calendar_id, summary = %request.summary, "inserting event");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::network("request timeout")
                } else if e.is_connect() {
                    ProviderError::network(format!("connection failed: {}", e))
                } else {
                    ProviderError::network(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::from_response(
                "event insert failed",
                status.as_u16(),
                &body,
            ));
        }

        let inserted: InsertedEvent = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {}", e))
        })?;

        Ok(CreatedEvent::new(inserted.id, inserted.html_link))
    }
}

impl CalendarInserter for GoogleCalendarClient {
    fn name(&self) -> &str {
        "google"
    }

    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        request: &'a EventRequest,
    ) -> BoxFuture<'a, ProviderResult<CreatedEvent>> {
        Box::pin(async move { self.insert(calendar_id, request).await })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertedEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    html_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use gcal_import_core::{DEFAULT_TIME_ZONE, EventRecord, to_request};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_request() -> EventRequest {
        let record = EventRecord::new("2024-06-01", "Standup")
            .with_times("09:00", "09:30")
            .with_location("Room 4");
        to_request(&record, DEFAULT_TIME_ZONE).unwrap()
    }

    async fn client_for(server: &MockServer) -> GoogleCalendarClient {
        GoogleCalendarClient::new("test-token", Duration::from_secs(5), server.uri()).unwrap()
    }

    #[test]
    fn events_url_encodes_calendar_id() {
        let client = GoogleCalendarClient::new(
            "t",
            Duration::from_secs(5),
            "https://www.googleapis.com/calendar/v3/",
        )
        .unwrap();
        assert_eq!(
            client.events_url("team@group.calendar.google.com"),
            "https://www.googleapis.com/calendar/v3/calendars/team%40group.calendar.google.com/events"
        );
        assert_eq!(client.name(), "google");
    }

    #[tokio::test]
    async fn insert_returns_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({
                "summary": "Standup",
                "location": "Room 4",
                "start": {
                    "dateTime": "2024-06-01T09:00:00",
                    "timeZone": "America/Los_Angeles"
                },
                "reminders": { "useDefault": true }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "calendar#event",
                "id": "evt1",
                "htmlLink": "https://www.google.com/calendar/event?eid=evt1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .await
            .insert("primary", &sample_request())
            .await
            .unwrap();

        assert_eq!(created.id.as_deref(), Some("evt1"));
        assert_eq!(
            created.link(),
            "https://www.google.com/calendar/event?eid=evt1"
        );
    }

    #[tokio::test]
    async fn insert_bad_request_carries_google_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "code": 400, "message": "The specified time range is empty." }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .insert("primary", &sample_request())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ProviderErrorCode::BadRequest);
        assert_eq!(err.status(), Some(400));
        assert!(err.message().contains("The specified time range is empty."));
    }

    #[tokio::test]
    async fn insert_unknown_calendar() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/missing/events"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": { "code": 404, "message": "Not Found" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .insert_event("missing", &sample_request())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ProviderErrorCode::NotFound);
    }

    #[tokio::test]
    async fn insert_unparseable_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .insert("primary", &sample_request())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }
}
