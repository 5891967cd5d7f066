//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;

/// gcal-import - add events from a JSON file to Google Calendar
#[derive(Debug, Parser)]
#[command(name = "gcal-import")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON file with an `events` array
    pub json_file_path: PathBuf,

    /// OAuth client secret file downloaded from Google Cloud Console
    #[arg(
        long,
        env = "GOOGLE_CREDENTIALS_FILE",
        default_value = "credentials.json"
    )]
    pub credentials: PathBuf,

    /// Calendar to insert into
    #[arg(long, env = "GCAL_CALENDAR_ID", default_value = "primary")]
    pub calendar_id: String,

    /// Where the OAuth token is stored (default: token.json)
    #[arg(long)]
    pub token_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, short, env = "GCAL_IMPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,
}
