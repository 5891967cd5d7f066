//! Credential acquisition: stored token, refresh, or interactive consent.

use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};

use super::config::{GoogleConfig, OAuthCredentials};
use super::oauth::OAuthClient;
use super::tokens::{TokenInfo, TokenStorage};

/// What the token file yielded.
#[derive(Debug)]
pub enum StoredToken {
    /// No usable token: absent, unreadable, missing scopes, or expired
    /// without a refresh token. The consent flow is needed.
    Missing,
    /// The stored token is valid as-is.
    Usable(TokenInfo),
    /// The stored token was expired and has been refreshed and saved.
    Refreshed(TokenInfo),
    /// Refreshing failed; the token file has been deleted.
    RefreshFailed(ProviderError),
}

/// Obtains a Calendar credential for one run.
#[derive(Debug)]
pub struct Authenticator {
    config: GoogleConfig,
    storage: TokenStorage,
}

impl Authenticator {
    /// Creates an authenticator for the given configuration.
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;
        let storage = TokenStorage::new(&config.token_path);
        Ok(Self { config, storage })
    }

    /// Returns the token storage.
    pub fn storage(&self) -> &TokenStorage {
        &self.storage
    }

    fn oauth_client(&self) -> ProviderResult<OAuthClient> {
        let credentials = OAuthCredentials::from_file(&self.config.credentials_path)?;
        credentials.validate().map_err(|e| {
            ProviderError::configuration(format!(
                "invalid credentials in {}: {}",
                self.config.credentials_path.display(),
                e
            ))
        })?;
        OAuthClient::new(credentials, self.config.timeout, &self.config.token_url)
    }

    /// Resolves the persisted token, refreshing it when expired.
    ///
    /// A refresh failure deletes the token file and is reported as
    /// [`StoredToken::RefreshFailed`] rather than an error.
    ///
    /// # Errors
    ///
    /// Fails only if the client secrets cannot be loaded for a refresh, or
    /// the token file cannot be rewritten or deleted.
    pub async fn load_stored(&self) -> ProviderResult<StoredToken> {
        let token = match self.storage.load() {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(StoredToken::Missing),
            Err(e) => {
                warn!("ignoring unreadable token file: {}", e);
                return Ok(StoredToken::Missing);
            }
        };

        if !token.has_scopes(&self.config.scopes) {
            info!("stored token lacks the required scopes");
            return Ok(StoredToken::Missing);
        }

        if !token.is_expired() {
            debug!("using stored access token");
            return Ok(StoredToken::Usable(token));
        }

        if !token.can_refresh() {
            info!("stored token expired and has no refresh token");
            return Ok(StoredToken::Missing);
        }
        let refresh_token = token.refresh_token.clone().unwrap_or_default();

        debug!("refreshing expired access token");
        let oauth = self.oauth_client()?;
        match oauth.refresh_token(&refresh_token).await {
            Ok(response) => {
                let mut token = token;
                token.apply_refresh(
                    response.access_token,
                    response.expires_in,
                    response.refresh_token,
                );
                self.storage.save(&token)?;
                Ok(StoredToken::Refreshed(token))
            }
            Err(e) => {
                warn!("token refresh failed: {}", e);
                self.storage.clear()?;
                Ok(StoredToken::RefreshFailed(e))
            }
        }
    }

    /// Returns a usable credential, falling back to the consent flow.
    ///
    /// A failed refresh is announced on stdout before re-authorizing.
    pub async fn get_credential(&self) -> ProviderResult<TokenInfo> {
        match self.load_stored().await? {
            StoredToken::Usable(token) | StoredToken::Refreshed(token) => Ok(token),
            StoredToken::RefreshFailed(e) => {
                println!(
                    "Error refreshing token: {}. Deleting token file and re-authenticating.",
                    e
                );
                self.authorize().await
            }
            StoredToken::Missing => self.authorize().await,
        }
    }

    /// Runs the interactive consent flow and persists the result.
    pub async fn authorize(&self) -> ProviderResult<TokenInfo> {
        info!("starting Google authorization");
        let oauth = self.oauth_client()?;
        let token = oauth
            .authorize(&self.config.scopes, self.config.loopback_port)
            .await?;
        self.storage.save(&token)?;
        Ok(token)
    }
}
