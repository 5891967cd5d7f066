//! Tracing setup for gcal-import
//!
//! Logs always go to stderr: stdout carries the per-event result lines and
//! must stay clean for scripts that read it.
//!
//! # Usage
//!
//! ```ignore
//! use gcal_import_core::tracing::{init_tracing, TracingConfig};
//!
//! let config = if debug { TracingConfig::cli_debug() } else { TracingConfig::default() };
//! init_tracing(config.with_format(format))?;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Target prefix shared by every crate in the workspace.
const TARGET_PREFIX: &str = "gcal_import";

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// The default directive did not parse
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for tracing logs, as spelled in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingOutputFormat {
    /// Multi-line human-readable format
    Pretty,
    /// Compact single-line format (default)
    #[default]
    Compact,
    /// JSON lines, for piping into log collectors
    Json,
}

/// How the import logs.
///
/// A normal run only shows warnings: skipped records and failed inserts.
/// `--debug` raises the level and adds timestamps, targets and source
/// locations to every line.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for `gcal_import*` targets when `RUST_LOG` is not set
    pub level: Level,
    /// Output format for log messages
    pub format: TracingOutputFormat,
    /// Timestamps, targets and file/line on every line
    pub detailed: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: TracingOutputFormat::Compact,
            detailed: false,
        }
    }
}

impl TracingConfig {
    /// The `--debug` configuration.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            format: TracingOutputFormat::Compact,
            detailed: true,
        }
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    /// The directive used when `RUST_LOG` is not set.
    fn default_directive(&self) -> String {
        format!("{}={}", TARGET_PREFIX, self.level)
    }

    fn layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let detailed = self.detailed;
        match (self.format, detailed) {
            (TracingOutputFormat::Json, _) => fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_file(detailed)
                .with_line_number(detailed)
                .with_target(detailed)
                .boxed(),
            (TracingOutputFormat::Pretty, true) => fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .boxed(),
            (TracingOutputFormat::Pretty, false) => fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_file(false)
                .with_line_number(false)
                .with_target(false)
                .without_time()
                .boxed(),
            (TracingOutputFormat::Compact, true) => fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            (TracingOutputFormat::Compact, false) => fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .boxed(),
        }
    }
}

/// Installs the global subscriber. Call once, before any other work.
///
/// `RUST_LOG` overrides the configured level when set and valid.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.default_directive())?,
    };

    let subscriber = tracing_subscriber::registry()
        .with(config.layer())
        .with(env_filter);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
