//! Google provider configuration and OAuth client secrets.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProviderError, ProviderResult};

/// OAuth 2.0 client credentials for Google API access.
///
/// These come from the client-secret JSON file downloaded from the Google
/// Cloud Console; Google requires every application to register its own.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
}

/// Structure of Google's OAuth credentials JSON file.
///
/// Supports two layouts:
/// 1. Google Cloud Console format with an "installed" or "web" section
/// 2. Flat format with client_id and client_secret at root level (e.g., from gcloud)
#[derive(Debug, Deserialize)]
struct GoogleCredentialsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    /// Creates new OAuth credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads OAuth credentials from a client-secret JSON file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;
        Self::from_json(&content)
    }

    /// Parses OAuth credentials from a Google credentials JSON string.
    ///
    /// Accepts `{"installed": {...}}`, `{"web": {...}}` or a flat
    /// `{"client_id": ..., "client_secret": ...}` object.
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let file: GoogleCredentialsFile = serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(format!("failed to parse credentials JSON: {}", e))
        })?;

        if let Some(creds) = file.installed.or(file.web) {
            return Ok(Self::new(creds.client_id, creds.client_secret));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err(ProviderError::configuration(
            "credentials file must contain an 'installed'/'web' section or 'client_id'/'client_secret' at root level",
        ))
    }

    /// Checks that the credentials look like a Google OAuth client.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Configuration for the Google authenticator and Calendar client.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Path to the OAuth client-secret JSON file.
    pub credentials_path: PathBuf,

    /// Path of the persisted token file.
    ///
    /// Defaults to `token.json` in the working directory.
    pub token_path: PathBuf,

    /// Request timeout for token and API calls.
    pub timeout: Duration,

    /// Port for the loopback OAuth redirect. `0` lets the OS pick one.
    pub loopback_port: u16,

    /// OAuth scopes to request.
    pub scopes: Vec<String>,

    /// Base URL of the Calendar API v3.
    pub api_base_url: String,

    /// Google's OAuth token endpoint.
    pub token_url: String,
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Scope that allows creating events and nothing else.
    pub const EVENTS_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar.events";

    /// Default token file name.
    pub const DEFAULT_TOKEN_FILE: &'static str = "token.json";

    /// Calendar API v3 base URL.
    pub const DEFAULT_API_BASE_URL: &'static str = "https://www.googleapis.com/calendar/v3";

    /// Google OAuth token endpoint.
    pub const DEFAULT_TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Creates a configuration that reads client secrets from the given file.
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            token_path: PathBuf::from(Self::DEFAULT_TOKEN_FILE),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            loopback_port: 0,
            scopes: vec![Self::EVENTS_SCOPE.to_string()],
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            token_url: Self::DEFAULT_TOKEN_URL.to_string(),
        }
    }

    /// Sets the token storage path.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the loopback port for OAuth.
    pub fn with_loopback_port(mut self, port: u16) -> Self {
        self.loopback_port = port;
        self
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Points token exchange and refresh at a different endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }
        if self.timeout.is_zero() {
            return Err("timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_validation() {
        let valid = OAuthCredentials::new("test-client.apps.googleusercontent.com", "test-secret");
        assert!(valid.validate().is_ok());

        let empty_id = OAuthCredentials::new("", "secret");
        assert!(empty_id.validate().is_err());

        let bad_id = OAuthCredentials::new("bad-id", "secret");
        assert!(bad_id.validate().is_err());

        let empty_secret = OAuthCredentials::new("test.apps.googleusercontent.com", "");
        assert!(empty_secret.validate().is_err());
    }

    #[test]
    fn config_defaults() {
        let config = GoogleConfig::new("credentials.json");
        assert_eq!(config.credentials_path, PathBuf::from("credentials.json"));
        assert_eq!(config.token_path, PathBuf::from("token.json"));
        assert_eq!(config.loopback_port, 0);
        assert_eq!(config.scopes, vec![GoogleConfig::EVENTS_SCOPE.to_string()]);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_methods() {
        let config = GoogleConfig::new("creds.json")
            .with_token_path("/tmp/tok.json")
            .with_timeout(Duration::from_secs(60))
            .with_loopback_port(8085)
            .with_token_url("http://127.0.0.1:9999/token");

        assert_eq!(config.token_path, PathBuf::from("/tmp/tok.json"));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.loopback_port, 8085);
        assert_eq!(config.token_url, "http://127.0.0.1:9999/token");
    }

    #[test]
    fn config_validation() {
        let no_scopes = GoogleConfig::new("c.json").with_scopes(vec![]);
        assert!(no_scopes.validate().is_err());

        let zero_timeout = GoogleConfig::new("c.json").with_timeout(Duration::ZERO);
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn credentials_from_json_installed() {
        let json = r#"{
            "installed": {
                "client_id": "test-id.apps.googleusercontent.com",
                "client_secret": "test-secret",
                "project_id": "my-project",
                "redirect_uris": ["http://localhost"]
            }
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "test-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "test-secret");
    }

    #[test]
    fn credentials_from_json_web() {
        let json = r#"{
            "web": {
                "client_id": "web-id.apps.googleusercontent.com",
                "client_secret": "web-secret"
            }
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "web-id.apps.googleusercontent.com");
    }

    #[test]
    fn credentials_from_json_flat() {
        let json = r#"{
            "client_id": "flat-id.apps.googleusercontent.com",
            "client_secret": "flat-secret",
            "refresh_token": "some-refresh-token"
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_secret, "flat-secret");
    }

    #[test]
    fn credentials_from_json_invalid() {
        let err = OAuthCredentials::from_json(r#"{ "other": {} }"#).unwrap_err();
        assert!(err.message().contains("client_id"));

        let err = OAuthCredentials::from_json("not json").unwrap_err();
        assert!(err.message().contains("parse"));
    }

    #[test]
    fn credentials_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = OAuthCredentials::from_file(dir.path().join("nope.json")).unwrap_err();
        assert_eq!(
            err.code(),
            crate::error::ProviderErrorCode::ConfigurationError
        );
    }
}
