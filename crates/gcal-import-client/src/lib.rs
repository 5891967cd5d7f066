//! gcal-import CLI: configuration, authentication and the import loop.
//!
//! This crate provides the `gcal-import` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use commands::import::{ImportSummary, submit_events};
pub use error::{ClientError, ClientResult};
