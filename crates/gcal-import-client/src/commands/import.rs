//! The import command: validate, authenticate, insert.

use std::io::{self, Write};
use std::path::Path;

use chrono_tz::Tz;
use gcal_import_core::{DEFAULT_TIME_ZONE, EventList, EventRecord, parse_event_list, to_requests};
use gcal_import_providers::CalendarInserter;
use gcal_import_providers::google::{Authenticator, GoogleCalendarClient};
use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Outcome counts of one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Events the calendar accepted.
    pub created: usize,
    /// Records that could not be built or were rejected.
    pub failed: usize,
}

/// Inserts each record in order, printing one result line per record.
///
/// Per-record failures are printed and skipped; nothing is retried or
/// deduplicated, so importing the same list twice creates every event twice.
///
/// # Errors
///
/// Only a failure to write to `out` is returned.
pub async fn submit_events<W: Write>(
    inserter: &dyn CalendarInserter,
    calendar_id: &str,
    records: &[EventRecord],
    tz: Tz,
    out: &mut W,
) -> io::Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for (record, prepared) in records.iter().zip(to_requests(records, tz)) {
        let request = match prepared {
            Ok(request) => request,
            Err(e) => {
                warn!(summary = %record.summary, "skipping record: {}", e);
                writeln!(out, "Failed to prepare event '{}': {}", record.summary, e)?;
                summary.failed += 1;
                continue;
            }
        };

        match inserter.insert_event(calendar_id, &request).await {
            Ok(created) => {
                debug!(backend = inserter.name(), id = ?created.id, "event created");
                writeln!(out, "Event created: {}", created.link())?;
                summary.created += 1;
            }
            Err(e) => {
                warn!(
                    backend = inserter.name(),
                    retryable = e.is_retryable(),
                    summary = %record.summary,
                    "insert failed: {}",
                    e
                );
                writeln!(out, "An error occurred: {}", e)?;
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Reads and validates the input file.
///
/// On a schema mismatch every issue is printed to `out` as a
/// `Validation Error:` line before the error is returned.
pub fn load_events<W: Write>(path: &Path, out: &mut W) -> ClientResult<EventList> {
    let text = std::fs::read_to_string(path).map_err(|source| ClientError::Input {
        path: path.to_path_buf(),
        source,
    })?;

    match parse_event_list(&text) {
        Ok(list) => Ok(list),
        Err(e) => {
            for issue in e.issues() {
                writeln!(out, "Validation Error: {}", issue)?;
            }
            Err(e.into())
        }
    }
}

/// Fails unless the OAuth client secret file exists.
pub fn ensure_credentials_file(path: &Path) -> ClientResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ClientError::CredentialsNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Runs a full import.
///
/// Validation happens before authentication, so a bad file never triggers
/// the browser flow.
pub async fn run<W: Write>(cli: &Cli, config: &ClientConfig, out: &mut W) -> ClientResult<ImportSummary> {
    ensure_credentials_file(&cli.credentials)?;

    let list = load_events(&cli.json_file_path, out)?;
    info!(
        count = list.len(),
        "loaded events from {}",
        cli.json_file_path.display()
    );

    let google = config.google_config(cli);
    let timeout = google.timeout;
    let api_base_url = google.api_base_url.clone();
    let token = Authenticator::new(google)?.get_credential().await?;

    let client = GoogleCalendarClient::new(token.access_token, timeout, api_base_url)?;
    let summary = submit_events(
        &client,
        &cli.calendar_id,
        &list.events,
        DEFAULT_TIME_ZONE,
        out,
    )
    .await?;

    info!(
        created = summary.created,
        failed = summary.failed,
        calendar_id = %cli.calendar_id,
        "import finished"
    );
    Ok(summary)
}
