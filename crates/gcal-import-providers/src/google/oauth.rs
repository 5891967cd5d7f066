//! OAuth 2.0 installed-app flow for Google APIs.
//!
//! Authorization Code flow with PKCE, using a loopback redirect:
//!
//! 1. Generate a code verifier and its SHA-256 challenge
//! 2. Bind a listener on 127.0.0.1 (port 0 lets the OS choose)
//! 3. Open the user's browser on Google's consent page
//! 4. Read the authorization code from the redirect
//! 5. Exchange the code (with the verifier) for access and refresh tokens

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};

use super::config::OAuthCredentials;
use super::tokens::TokenInfo;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// The PKCE code verifier length (in bytes, before base64 encoding).
const CODE_VERIFIER_LENGTH: usize = 32;

/// How long to wait for the browser redirect.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// OAuth client for Google APIs.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    http_client: reqwest::Client,
    token_url: String,
}

impl OAuthClient {
    /// Creates a new OAuth client that exchanges and refreshes tokens at
    /// `token_url`.
    pub fn new(
        credentials: OAuthCredentials,
        timeout: Duration,
        token_url: impl Into<String>,
    ) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            credentials,
            http_client,
            token_url: token_url.into(),
        })
    }

    /// Runs the interactive consent flow and returns the obtained tokens.
    ///
    /// Blocks (up to five minutes) until the browser hits the loopback
    /// redirect.
    ///
    /// # Errors
    ///
    /// Fails if the loopback port cannot be bound, the user denies access,
    /// the redirect never arrives, or the code exchange is rejected.
    pub async fn authorize(&self, scopes: &[String], port: u16) -> ProviderResult<TokenInfo> {
        let pkce = PkceFlow::new();

        let (listener, port) = Self::bind_loopback_server(port)?;
        let redirect_uri = format!("http://127.0.0.1:{}/", port);

        let auth_url = pkce.build_auth_url(&self.credentials.client_id, &redirect_uri, scopes);

        info!("starting OAuth flow, opening browser");
        debug!("authorization URL: {}", auth_url);

        if let Err(e) = open::that(&auth_url) {
            warn!("failed to open browser: {}", e);
            eprintln!("\nPlease open this URL in your browser:\n\n{}\n", auth_url);
        }

        let (code, received_state) = Self::wait_for_callback(listener)?;

        if received_state != pkce.state {
            return Err(ProviderError::authentication(
                "OAuth state mismatch in redirect",
            ));
        }

        info!("received authorization code, exchanging for tokens");
        self.exchange_code(&code, &pkce.verifier, &redirect_uri, scopes)
            .await
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// Returns the new access token, its lifetime in seconds, and a rotated
    /// refresh token if Google issued one.
    pub async fn refresh_token(&self, refresh_token: &str) -> ProviderResult<TokenResponse> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let token_response = self.post_token_form(&params, "token refresh failed").await?;
        info!("refreshed access token");
        Ok(token_response)
    }

    async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> ProviderResult<TokenInfo> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let token_response = self.post_token_form(&params, "token exchange failed").await?;

        info!("obtained tokens");
        let granted = token_response
            .scope
            .as_deref()
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_else(|| scopes.to_vec());
        Ok(TokenInfo::new(
            token_response.access_token,
            token_response.refresh_token,
            token_response.expires_in,
            granted,
        ))
    }

    async fn post_token_form(
        &self,
        params: &[(&str, &str)],
        context: &str,
    ) -> ProviderResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::network(format!("{}: request error: {}", context, e)).with_source(e)
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::from_response(context, status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(format!("invalid token response: {}", e)))
    }

    /// Binds the redirect listener. Port `0` asks the OS for a free port.
    fn bind_loopback_server(port: u16) -> ProviderResult<(TcpListener, u16)> {
        let listener = TcpListener::bind(("127.0.0.1", port)).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to bind loopback port {}: {}",
                port, e
            ))
        })?;
        let bound = listener
            .local_addr()
            .map_err(|e| ProviderError::internal(format!("failed to read local address: {}", e)))?
            .port();
        debug!("bound loopback server on port {}", bound);
        Ok((listener, bound))
    }

    /// Waits for the redirect and extracts `(code, state)`.
    fn wait_for_callback(listener: TcpListener) -> ProviderResult<(String, String)> {
        let (tx, rx) = mpsc::channel();

        // The accept loop blocks; run it off-thread so we can time out.
        thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        if let Some(result) = Self::handle_callback(stream) {
                            let _ = tx.send(result);
                            return;
                        }
                    }
                    Err(e) => error!("failed to accept connection: {}", e),
                }
            }
        });

        match rx.recv_timeout(CALLBACK_TIMEOUT) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                Err(ProviderError::authentication("timed out waiting for OAuth redirect"))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(ProviderError::internal("callback channel disconnected"))
            }
        }
    }

    /// Handles one HTTP request on the loopback listener.
    ///
    /// Returns `None` for requests that are not the redirect (favicon
    /// probes and the like) so the accept loop keeps going.
    fn handle_callback(mut stream: TcpStream) -> Option<ProviderResult<(String, String)>> {
        let mut request_line = String::new();
        BufReader::new(&stream).read_line(&mut request_line).ok()?;

        let outcome = parse_redirect_request(&request_line)?;

        let response = match outcome {
            Ok(_) => {
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
                <html><body><h1>Authorization complete</h1>\
                <p>You can close this window and return to the terminal.</p></body></html>"
            }
            Err(_) => {
                "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
                <html><body><h1>Authorization failed</h1>\
                <p>You can close this window.</p></body></html>"
            }
        };
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.flush();

        Some(outcome)
    }
}

/// Parses a request line such as `GET /?code=...&state=... HTTP/1.1`.
///
/// Returns `None` if the request carries neither a code nor an error.
fn parse_redirect_request(request_line: &str) -> Option<ProviderResult<(String, String)>> {
    let mut parts = request_line.split_whitespace();
    if parts.next()? != "GET" {
        return None;
    }
    let target = parts.next()?;
    let url = Url::parse("http://127.0.0.1").ok()?.join(target).ok()?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Some(Err(ProviderError::authentication(format!(
            "authorization denied: {}",
            error
        ))));
    }
    let code = code?;
    Some(Ok((code, state.unwrap_or_default())))
}

/// PKCE verifier, challenge and state (RFC 7636).
#[derive(Debug)]
pub struct PkceFlow {
    /// High-entropy random code verifier.
    pub verifier: String,
    /// SHA-256 of the verifier, base64url encoded.
    pub challenge: String,
    /// Random state echoed back by the redirect.
    pub state: String,
}

impl PkceFlow {
    /// Creates a new PKCE flow with a random verifier and state.
    pub fn new() -> Self {
        let verifier = random_token(CODE_VERIFIER_LENGTH);
        let challenge = Self::compute_challenge(&verifier);
        let state = random_token(16);

        Self {
            verifier,
            challenge,
            state,
        }
    }

    fn compute_challenge(verifier: &str) -> String {
        let digest = Sha256::digest(verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(digest)
    }

    /// Builds the Google consent page URL.
    pub fn build_auth_url(&self, client_id: &str, redirect_uri: &str, scopes: &[String]) -> String {
        let scope = scopes.join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            GOOGLE_AUTH_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Response from Google's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// The new access token.
    pub access_token: String,
    /// Present on code exchange, and on refresh when Google rotates it.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Space-separated granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}
