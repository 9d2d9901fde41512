mod cli;
mod dashboard;
mod error;
mod output;

use std::io;
use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;
use crate::dashboard::LoadOptions;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();

    let instruments = dashboard::instruments(&cli)?;
    let options = LoadOptions::from_cli(&cli)?;
    let panels = dashboard::load(instruments, dashboard::fetcher(&cli), options).await?;

    let stdout = io::stdout();
    output::render(&panels, cli.format, cli.pretty, &mut stdout.lock())?;

    if panels.iter().any(|panel| panel.failed()) {
        return Ok(ExitCode::from(3));
    }

    Ok(ExitCode::SUCCESS)
}
