//! Client error types.
//!
//! Everything here ends the run with exit status 1. Failures of a single
//! event never become a `ClientError`; the import loop prints them and moves
//! on.

use std::path::PathBuf;

use gcal_import_core::{TracingError, ValidationError};
use gcal_import_providers::ProviderError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The OAuth client secret file does not exist.
    #[error(
        "Credentials file '{}' not found. Download an OAuth client ID (Desktop app) from the Google Cloud Console and pass it with --credentials.",
        path.display()
    )]
    CredentialsNotFound {
        /// The path that was checked.
        path: PathBuf,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Input {
        /// The input file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The input did not match the event-list schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Authentication or another provider failure outside the import loop.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Writing results failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Logging could not be set up.
    #[error(transparent)]
    Tracing(#[from] TracingError),
}
