//! OAuth token persistence.
//!
//! The token file is plain JSON next to the working directory by default.
//! Every operation opens, reads or writes, and closes the file; nothing is
//! cached in memory between calls.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

/// Access tokens are treated as expired this long before their real expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// An OAuth token set: the credential used for Calendar API calls.
///
/// Files written by Google's Python client use `token` and `expiry` for the
/// access token and its expiry; both spellings are accepted when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The access token for API requests.
    #[serde(alias = "token")]
    pub access_token: String,

    /// The refresh token for obtaining new access tokens.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// When the access token expires.
    #[serde(default, alias = "expiry")]
    pub expires_at: Option<DateTime<Utc>>,

    /// The OAuth scopes that were granted.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenInfo {
    /// Creates a new token info from OAuth response data.
    ///
    /// A lifetime too large to represent is stored as no expiry.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.and_then(expiry_from_now),
            scopes,
        }
    }

    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false,
        }
    }

    /// Returns true if the token can be refreshed.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Returns true if the token has the required scopes.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Replaces the access token after a refresh.
    ///
    /// Google may rotate the refresh token; a new one replaces the old.
    pub fn apply_refresh(
        &mut self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
        refresh_token: Option<String>,
    ) {
        self.access_token = access_token.into();
        self.expires_at = expires_in_secs.and_then(expiry_from_now);
        if refresh_token.is_some() {
            self.refresh_token = refresh_token;
        }
    }
}

fn expiry_from_now(secs: i64) -> Option<DateTime<Utc>> {
    let lifetime = Duration::try_seconds(secs.checked_sub(EXPIRY_MARGIN_SECS)?)?;
    Utc::now().checked_add_signed(lifetime)
}

/// File-backed token storage.
#[derive(Debug, Clone)]
pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    /// Creates a new token storage at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the token file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file exists but cannot be read
    /// or parsed.
    pub fn load(&self) -> ProviderResult<Option<TokenInfo>> {
        if !self.path.exists() {
            debug!("no token file at {}", self.path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ProviderError::configuration(format!("failed to read token file: {}", e))
        })?;

        let tokens: TokenInfo = serde_json::from_str(&content).map_err(|e| {
            ProviderError::configuration(format!("failed to parse token file: {}", e))
        })?;

        debug!("loaded tokens from {}", self.path.display());
        Ok(Some(tokens))
    }

    /// Writes the token file, replacing any previous contents.
    pub fn save(&self, tokens: &TokenInfo) -> ProviderResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                ProviderError::configuration(format!("failed to create token directory: {}", e))
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(tokens)
            .map_err(|e| ProviderError::internal(format!("failed to serialize tokens: {}", e)))?;

        fs::write(&temp_path, &content).map_err(|e| {
            ProviderError::configuration(format!("failed to write token file: {}", e))
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            ProviderError::configuration(format!("failed to rename token file: {}", e))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        info!("saved tokens to {}", self.path.display());
        Ok(())
    }

    /// Deletes the token file.
    ///
    /// Returns `Ok(true)` if a file was removed.
    pub fn clear(&self) -> ProviderResult<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).map_err(|e| {
            ProviderError::configuration(format!("failed to remove token file: {}", e))
        })?;
        info!("removed token file {}", self.path.display());
        Ok(true)
    }

    /// Returns the token storage path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Vec<String> {
        vec!["https://www.googleapis.com/auth/calendar.events".to_string()]
    }

    #[test]
    fn token_info_creation() {
        let token = TokenInfo::new("access-token", Some("refresh-token".to_string()), Some(3600), scope());

        assert_eq!(token.access_token, "access-token");
        assert!(token.expires_at.is_some());
        assert!(!token.is_expired());
        assert!(token.can_refresh());
        assert!(token.has_scopes(&scope()));
    }

    #[test]
    fn token_info_expired() {
        let mut token = TokenInfo::new("access", None, Some(3600), scope());
        token.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(token.is_expired());
        assert!(!token.can_refresh());
    }

    #[test]
    fn token_info_short_lifetime_counts_as_expired() {
        let token = TokenInfo::new("access", None, Some(30), scope());
        assert!(token.is_expired());
    }

    #[test]
    fn huge_lifetime_is_stored_without_expiry() {
        let token = TokenInfo::new("a", None, Some(i64::MAX), vec![]);
        assert!(token.expires_at.is_none());
        assert!(!token.is_expired());

        let token = TokenInfo::new("a", None, Some(i64::MIN), vec![]);
        assert!(token.expires_at.is_none());

        let mut token = TokenInfo::new("a", None, Some(3600), vec![]);
        token.apply_refresh("b", Some(i64::MAX), None);
        assert!(token.expires_at.is_none());
    }

    #[test]
    fn token_info_scope_check() {
        let token = TokenInfo::new("access", None, None, vec!["scope1".to_string()]);
        assert!(token.has_scopes(&["scope1".to_string()]));
        assert!(!token.has_scopes(&["scope2".to_string()]));
        assert!(!token.has_scopes(&scope()));
    }

    #[test]
    fn apply_refresh_keeps_refresh_token_unless_rotated() {
        let mut token = TokenInfo::new("old", Some("r1".to_string()), Some(0), scope());
        token.apply_refresh("new", Some(3600), None);
        assert_eq!(token.access_token, "new");
        assert_eq!(token.refresh_token.as_deref(), Some("r1"));
        assert!(!token.is_expired());

        token.apply_refresh("newer", Some(3600), Some("r2".to_string()));
        assert_eq!(token.refresh_token.as_deref(), Some("r2"));
    }

    #[test]
    fn reads_python_client_token_format() {
        let json = r#"{
            "token": "ya29.abc",
            "refresh_token": "1//refresh",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "id.apps.googleusercontent.com",
            "client_secret": "secret",
            "scopes": ["https://www.googleapis.com/auth/calendar.events"],
            "expiry": "2020-01-01T00:00:00.000000Z"
        }"#;
        let token: TokenInfo = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "ya29.abc");
        assert!(token.can_refresh());
        assert!(token.is_expired());
        assert!(token.has_scopes(&scope()));
    }

    #[test]
    fn storage_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("token.json"));

        let token = TokenInfo::new("access-token", Some("refresh-token".to_string()), Some(3600), scope());
        storage.save(&token).unwrap();
        assert!(storage.path().exists());

        let loaded = TokenStorage::new(storage.path()).load().unwrap().unwrap();
        assert_eq!(loaded, token);
    }

    #[test]
    fn storage_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("token.json"));

        storage.save(&TokenInfo::new("first", None, None, scope())).unwrap();
        storage.save(&TokenInfo::new("second", None, None, scope())).unwrap();

        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "second");
    }

    #[cfg(unix)]
    #[test]
    fn storage_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("token.json"));
        storage.save(&TokenInfo::new("a", None, None, scope())).unwrap();

        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn storage_clear() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("token.json"));

        storage.save(&TokenInfo::new("access", None, None, vec![])).unwrap();
        assert!(storage.clear().unwrap());
        assert!(!storage.path().exists());
        assert!(!storage.clear().unwrap());
    }

    #[test]
    fn storage_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("token.json"));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn storage_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "{ not json").unwrap();

        let err = TokenStorage::new(&path).load().unwrap_err();
        assert!(err.message().contains("failed to parse token file"));
    }
}
