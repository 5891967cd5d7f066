//! Google Calendar backend.
//!
//! - [`Authenticator`] resolves a credential from the token file, refreshing
//!   it when expired, or runs the installed-app consent flow
//! - [`GoogleCalendarClient`] inserts events through the Calendar API v3
//!
//! # Authentication Flow
//!
//! 1. Load `token.json`; use it if it is still valid
//! 2. If expired and refreshable, refresh it and write it back
//! 3. If refresh fails, delete the file and fall through
//! 4. Otherwise open the browser on Google's consent page, receive the code
//!    on a loopback listener, exchange it and save the new token

mod auth;
mod client;
mod config;
mod oauth;
mod tokens;

pub use auth::{Authenticator, StoredToken};
pub use client::GoogleCalendarClient;
pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::{OAuthClient, PkceFlow, TokenResponse};
pub use tokens::{TokenInfo, TokenStorage};
