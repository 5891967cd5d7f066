//! gcal-import CLI entry point.

use std::io;
use std::process::ExitCode;

use clap::Parser;

use gcal_import_client::cli::Cli;
use gcal_import_client::commands::import;
use gcal_import_client::config::ClientConfig;
use gcal_import_client::error::ClientResult;
use gcal_import_core::{TracingConfig, init_tracing};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    // Before any other file or network access
    import::ensure_credentials_file(&cli.credentials)?;

    let config = ClientConfig::for_cli(&cli)?;

    let tracing = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    init_tracing(tracing.with_format(config.logging.format))?;

    let mut stdout = io::stdout().lock();
    import::run(&cli, &config, &mut stdout).await?;
    Ok(())
}
