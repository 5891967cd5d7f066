//! Client configuration.
//!
//! All settings live in an optional `config.toml` file at
//! `~/.config/gcal-import/config.toml` by default. Command-line flags win
//! over environment variables, which win over the file.
//!
//! ```toml
//! [google]
//! token_path = "/home/me/.local/share/gcal-import/token.json"
//! timeout_secs = 30
//! loopback_port = 0
//!
//! [logging]
//! format = "json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use gcal_import_core::TracingOutputFormat;
use gcal_import_providers::google::GoogleConfig;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{ClientError, ClientResult};

/// Configuration for the gcal-import client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Google authentication and API settings.
    pub google: GoogleSettings,

    /// Log output settings.
    pub logging: LoggingSettings,
}

/// Google settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GoogleSettings {
    /// Path to token storage.
    pub token_path: Option<PathBuf>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// Loopback port for the OAuth redirect (0 = any free port).
    pub loopback_port: Option<u16>,
}

/// Log output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Log line format.
    pub format: TracingOutputFormat,
}

impl ClientConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Loads the file named on the command line, or the default one.
    pub fn for_cli(cli: &Cli) -> ClientResult<Self> {
        match cli.config.as_deref() {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gcal-import")
            .join("config.toml")
    }

    /// Builds the provider configuration, applying command-line overrides.
    pub fn google_config(&self, cli: &Cli) -> GoogleConfig {
        let mut config = GoogleConfig::new(&cli.credentials);

        if let Some(path) = cli.token_file.as_ref().or(self.google.token_path.as_ref()) {
            config = config.with_token_path(path);
        }
        if let Some(secs) = self.google.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(port) = self.google.loopback_port {
            config = config.with_loopback_port(port);
        }
        config
    }
}
