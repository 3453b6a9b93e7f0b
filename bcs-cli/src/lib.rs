//! Command-line driver for the conservation-strategy buffering engine.
//!
//! Wires JSON survey exports and reference tables into one engine run:
//! the WNS onset table and buffer policy load at start-up (and abort the
//! run when missing or malformed), the survey records stream through the
//! pipeline, and the deduplicated buffer requests land in an output JSON
//! file for the downstream geometry service.
#![forbid(unsafe_code)]

mod error;
pub mod input;
mod store;

use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Parser;

use bcs_core::{BufferEngine, BufferPolicy, SurveyStore, WnsReference};

pub use error::CliError;
pub use store::JsonSurveyStore;

/// Run the CLI with the current process arguments.
pub fn run() -> Result<(), CliError> {
    run_from(std::env::args_os())
}

/// Run the CLI with explicit arguments.
pub fn run_from<I, A>(args: I) -> Result<(), CliError>
where
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(CliError::ArgumentParsing)?;

    require_existing(&cli.sites, "sites")?;
    if let Some(path) = &cli.captures {
        require_existing(path, "captures")?;
    }
    require_existing(&cli.wns_table, "wns-table")?;
    require_existing(&cli.policy, "policy")?;

    let wns: WnsReference = read_json(&cli.wns_table)?;
    let policy: BufferPolicy = read_json(&cli.policy)?;
    let as_of = match &cli.as_of {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|source| {
            CliError::InvalidAsOfDate {
                text: text.clone(),
                source,
            }
        })?,
        // The engine takes an explicit date; only this edge touches the clock.
        None => chrono::Local::now().date_naive(),
    };

    let engine = BufferEngine::new(wns, policy, as_of)?;
    let mut store = JsonSurveyStore::new(cli.sites, cli.captures, cli.output);

    let survey = store.load()?;
    let outcome = engine.run(survey);
    store.write_requests(&outcome.requests)?;

    for skipped in &outcome.report.skipped {
        log::warn!("skipped record {}: {}", skipped.record_id, skipped.reason);
    }
    log::info!(
        "wrote {} buffer requests ({} duplicates discarded, {} records skipped)",
        outcome.requests.len(),
        outcome.report.duplicates_discarded,
        outcome.report.skipped.len()
    );
    Ok(())
}

fn require_existing(path: &Path, field: &'static str) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let file = File::open(path).map_err(|source| CliError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseInput {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Parser)]
#[command(
    name = "bcsbuffer",
    about = "Generate tiered bat-conservation buffer requests from survey exports",
    version
)]
struct Cli {
    /// Path to the JSON export of sites with nested visits.
    #[arg(long, value_name = "path")]
    sites: PathBuf,
    /// Path to the JSON export of capture events.
    #[arg(long, value_name = "path")]
    captures: Option<PathBuf>,
    /// Path to the WNS onset reference table (JSON map of unit code to year).
    #[arg(long, value_name = "path")]
    wns_table: PathBuf,
    /// Path to the buffer policy (JSON).
    #[arg(long, value_name = "path")]
    policy: PathBuf,
    /// Path the buffer-request JSON array is written to.
    #[arg(long, value_name = "path")]
    output: PathBuf,
    /// Processing date for the snag age gate, YYYY-MM-DD. Defaults to today.
    #[arg(long, value_name = "date")]
    as_of: Option<String>,
}

#[cfg(test)]
mod tests;
