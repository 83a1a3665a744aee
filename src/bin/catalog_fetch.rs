//! Fetch stage: download every configured source and save it as JSON.
//!
//! Exit status is 0 when every source was saved and 1 when any failed.

use anyhow::{Result, bail};
use catalogmd::{Config, LogLevel, download_all, logging};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "catalog-fetch",
    version,
    about = "Download the configured JSON documents into the local store"
)]
struct Cli {
    /// Config file (default: ./catalogmd.json when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory; overrides `save_path`
    #[arg(long)]
    save_path: Option<PathBuf>,

    /// Base log level (trace|debug|info|warn|error)
    #[arg(long, value_parser = parse_level)]
    log_level: Option<LogLevel>,

    /// Increase verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let mut config = Config::discover(cli.config.as_deref())?;
    if let Some(save_path) = cli.save_path {
        config.save_path = save_path;
    }
    let level = cli.log_level.unwrap_or(config.logging.level);
    logging::init(level.raised(cli.verbose))?;

    if config.sources.is_empty() {
        bail!("no sources configured; add a \"sources\" map to the config file");
    }

    let summary = download_all(&config);
    for outcome in &summary.outcomes {
        match (&outcome.saved_to, &outcome.error) {
            (Some(path), _) => println!("{}: saved {}", outcome.name, path.display()),
            (None, Some(err)) => println!("{}: failed ({err})", outcome.name),
            (None, None) => println!("{}: skipped", outcome.name),
        }
    }
    Ok(summary.exit_code())
}

fn parse_level(raw: &str) -> Result<LogLevel, String> {
    LogLevel::parse(raw).map_err(|err| err.to_string())
}
