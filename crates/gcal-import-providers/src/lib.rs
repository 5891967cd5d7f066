//! Calendar backends for event import.
//!
//! - [`CalendarInserter`] - the contract the import loop drives
//! - [`google`] - OAuth credential handling and the Calendar API client
//! - [`ProviderError`] - error type for both
//!
//! ```ignore
//! use gcal_import_providers::google::{Authenticator, GoogleCalendarClient, GoogleConfig};
//!
//! let config = GoogleConfig::new("credentials.json");
//! let token = Authenticator::new(config.clone())?.get_credential().await?;
//! let client = GoogleCalendarClient::new(token.access_token, config.timeout, config.api_base_url)?;
//! let created = client.insert_event("primary", &request).await?;
//! ```

pub mod error;
pub mod google;
pub mod provider;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use provider::{BoxFuture, CalendarInserter, CreatedEvent};
