//! Render stage: flatten every catalog/text pair in the store into markdown.
//!
//! Exit status is 0 when every catalog rendered and 1 when inputs were missing
//! or any catalog failed. One summary line per catalog goes to stdout.

use anyhow::{Result, bail};
use catalogmd::{Config, LogLevel, logging, pipeline};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(
    name = "catalog-render",
    version,
    about = "Flatten fetched catalog JSON into markdown documents"
)]
struct Cli {
    /// Config file (default: ./catalogmd.json when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the fetched JSON; overrides `save_path`
    #[arg(long)]
    save_path: Option<PathBuf>,

    /// Log every real_id that has no usable text
    #[arg(long)]
    warn_missing_text: bool,

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
    if cli.warn_missing_text {
        config.warn_on_missing_text = true;
    }
    if config.content_sets().is_empty() {
        bail!(
            "no content sets configured; add \"sources\" or \"content_sets\" to the config file"
        );
    }
    let level = cli.log_level.unwrap_or(config.logging.level);
    logging::init(level.raised(cli.verbose))?;

    let summary = match pipeline::run(&config) {
        Ok(summary) => summary,
        Err(err) => {
            error!("{err}");
            return Ok(1);
        }
    };

    for outcome in &summary.outcomes {
        match &outcome.error {
            None => println!("{}.md: {} chars", outcome.catalog, outcome.length.count),
            Some(err) => println!("{}: failed ({err})", outcome.catalog),
        }
    }
    Ok(summary.exit_code())
}

fn parse_level(raw: &str) -> Result<LogLevel, String> {
    LogLevel::parse(raw).map_err(|err| err.to_string())
}
