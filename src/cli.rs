//! Command line interface
//!
//! Subcommands:
//!   - `ingest` - Parse a participant open interest file and store it
//!   - `show`   - Print the derived table
//!   - `export` - Write the derived table to CSV
//!   - `spot`   - Store NIFTY closing prices (manual or fetched)
//!   - `status` - Summarize the database
//!   - `delete` - Remove one trading date
//!
//! Handlers stay thin and delegate to the services layer; everything the
//! user reads goes through `println!`, diagnostics through `tracing`.

use crate::display;
use crate::error::Result;
use crate::ingest::dates;
use crate::layout::Section;
use crate::models::DerivedRecord;
use crate::provider::yahoo::YahooProvider;
use crate::services::{AnalysisService, ExportService, IngestService, SpotResult, SpotService};
use crate::state::AppState;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DB: &str = "oi_analyzer.db";

#[derive(Parser)]
#[command(
    name = "oi-analyzer",
    version,
    about = "Derived-metrics engine for NSE participant-wise open interest",
    propagate_version = true,
)]
pub struct Cli {
    /// Path to the SQLite database file
    #[arg(long, global = true, default_value = DEFAULT_DB)]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a participant open interest file and store its records
    Ingest(IngestArgs),
    /// Print the derived table
    Show(ShowArgs),
    /// Export the derived table to CSV
    Export(ExportArgs),
    /// Manage NIFTY closing prices
    Spot(SpotArgs),
    /// Summarize what the database holds
    Status(StatusArgs),
    /// Delete one trading date from the database
    Delete(DeleteArgs),
}

#[derive(Parser)]
pub struct IngestArgs {
    /// Participant-wise open interest file (CSV)
    pub file: PathBuf,

    /// NIFTY close to store for the file's newest date
    #[arg(long, conflicts_with = "fetch_spot")]
    pub spot: Option<f64>,

    /// Fetch the NIFTY close for the file's newest date from Yahoo Finance
    #[arg(long, default_value_t = false)]
    pub fetch_spot: bool,

    /// Overwrite dates already stored instead of rejecting them
    #[arg(long, default_value_t = false)]
    pub replace: bool,

    /// Treat incomplete participant data as an error
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Show one section only: option, future, stock, nifty or total
    #[arg(long, value_parser = parse_section)]
    pub section: Option<Section>,

    /// Show only the newest N trading dates
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Output CSV path
    pub path: PathBuf,
}

#[derive(Parser)]
pub struct SpotArgs {
    #[command(subcommand)]
    pub command: SpotCommands,
}

#[derive(Subcommand)]
pub enum SpotCommands {
    /// Store a closing price by hand
    Set {
        /// Trading date (e.g. 2025-12-05 or 05-12-2025)
        #[arg(value_parser = parse_date)]
        date: NaiveDate,

        /// Closing price
        price: f64,
    },
    /// Fetch the closing price from Yahoo Finance
    Fetch {
        /// Trading date (e.g. 2025-12-05 or 05-12-2025)
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
}

#[derive(Parser)]
pub struct StatusArgs {
    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct DeleteArgs {
    /// Trading date to delete (e.g. 2025-12-05 or 05-12-2025)
    #[arg(value_parser = parse_date)]
    pub date: NaiveDate,
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    dates::parse_cell(s).ok_or_else(|| format!("Unrecognized date '{}'", s))
}

fn parse_section(s: &str) -> std::result::Result<Section, String> {
    Section::parse(s).ok_or_else(|| {
        format!(
            "Unknown section '{}'; use option, future, stock, nifty or total",
            s
        )
    })
}

/// Run the parsed command against the database named on the command line
pub async fn run(cli: Cli) -> Result<()> {
    let state = AppState::new(&cli.db)?;

    match cli.command {
        Commands::Ingest(args) => cmd_ingest(&state, args).await,
        Commands::Show(args) => cmd_show(&state, args),
        Commands::Export(args) => cmd_export(&state, args),
        Commands::Spot(args) => match args.command {
            SpotCommands::Set { date, price } => cmd_spot_set(&state, date, price),
            SpotCommands::Fetch { date } => cmd_spot_fetch(&state, date).await,
        },
        Commands::Status(args) => cmd_status(&state, args),
        Commands::Delete(args) => cmd_delete(&state, args.date),
    }
}

async fn cmd_ingest(state: &AppState, args: IngestArgs) -> Result<()> {
    let report = IngestService::ingest_file(state, &args.file, args.replace, args.strict)?;

    println!(
        "Ingested {} records across {} trading dates ({})",
        report.inserted,
        report.dates.len(),
        report.date_source
    );
    for gap in &report.gaps {
        println!("  note: {}", gap);
    }

    if let Some(newest) = report.newest_date() {
        if let Some(price) = args.spot {
            let spot = SpotService::set_manual(state, newest, price)?;
            print_spot(&spot);
        } else if args.fetch_spot {
            // Best effort: the records are already stored, so a dead network
            // must not fail the ingest.
            match SpotService::fetch(state, &YahooProvider::new(), newest).await {
                Ok(spot) => print_spot(&spot),
                Err(e) => println!("Spot fetch failed: {} (use `spot set` to enter it)", e),
            }
        }
    }

    Ok(())
}

fn cmd_show(state: &AppState, args: ShowArgs) -> Result<()> {
    let table = AnalysisService::derived_table(state)?;

    if table.records.is_empty() {
        println!("Database is empty. Ingest a participant file first.");
        return Ok(());
    }

    let view = limit_dates(&table.records, args.limit);
    println!("{}", display::render_table(view, args.section));

    let shown: std::collections::BTreeSet<NaiveDate> =
        view.iter().map(|r| r.raw.date).collect();
    println!("{} rows across {} trading dates", view.len(), shown.len());

    for gap in &table.gaps {
        println!("note: {}", gap);
    }

    Ok(())
}

/// Truncate to the newest `limit` trading dates. Records arrive newest
/// first with each date's rows contiguous, so this is a prefix.
fn limit_dates(records: &[DerivedRecord], limit: Option<usize>) -> &[DerivedRecord] {
    let limit = match limit {
        Some(n) => n,
        None => return records,
    };

    let mut seen = 0usize;
    let mut last: Option<NaiveDate> = None;
    for (i, r) in records.iter().enumerate() {
        if last != Some(r.raw.date) {
            last = Some(r.raw.date);
            seen += 1;
            if seen > limit {
                return &records[..i];
            }
        }
    }
    records
}

fn cmd_export(state: &AppState, args: ExportArgs) -> Result<()> {
    let result = ExportService::export_csv(state, &args.path)?;
    println!("Exported {} rows to {}", result.rows, result.path);
    Ok(())
}

fn cmd_spot_set(state: &AppState, date: NaiveDate, price: f64) -> Result<()> {
    let spot = SpotService::set_manual(state, date, price)?;
    print_spot(&spot);
    Ok(())
}

async fn cmd_spot_fetch(state: &AppState, date: NaiveDate) -> Result<()> {
    let spot = SpotService::fetch(state, &YahooProvider::new(), date).await?;
    print_spot(&spot);
    Ok(())
}

fn cmd_status(state: &AppState, args: StatusArgs) -> Result<()> {
    let summary = AnalysisService::status(state)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Database:      {}", summary.db_path);
    println!("Records:       {}", summary.record_count);
    println!("Trading dates: {}", summary.date_count);
    println!("Spot prices:   {}", summary.spot_count);
    match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => println!("Date range:    {} to {}", first, last),
        _ => println!("Date range:    empty"),
    }

    Ok(())
}

fn cmd_delete(state: &AppState, date: NaiveDate) -> Result<()> {
    let (records, spots) = IngestService::remove_date(state, date)?;
    println!(
        "Deleted {} records and {} spot prices for {}",
        records, spots, date
    );
    Ok(())
}

fn print_spot(spot: &SpotResult) {
    match spot.close_date {
        Some(close) if close != spot.date => println!(
            "Stored NIFTY close {:.2} for {} ({}, close from {})",
            spot.price, spot.date, spot.source, close
        ),
        _ => println!(
            "Stored NIFTY close {:.2} for {} ({})",
            spot.price, spot.date, spot.source
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OpenInterestRecord;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_ingest_flags() {
        let cli = Cli::try_parse_from([
            "oi-analyzer",
            "ingest",
            "fao_participant_oi_05122025.csv",
            "--replace",
            "--strict",
        ])
        .unwrap();

        match cli.command {
            Commands::Ingest(args) => {
                assert!(args.replace);
                assert!(args.strict);
                assert!(!args.fetch_spot);
                assert_eq!(args.spot, None);
            }
            _ => panic!("expected ingest"),
        }
    }

    #[test]
    fn test_spot_conflicts_with_fetch_spot() {
        let result = Cli::try_parse_from([
            "oi-analyzer",
            "ingest",
            "oi.csv",
            "--spot",
            "24675.45",
            "--fetch-spot",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parses_spot_set_dates_day_first() {
        let cli =
            Cli::try_parse_from(["oi-analyzer", "spot", "set", "05-12-2025", "24675.45"]).unwrap();

        match cli.command {
            Commands::Spot(args) => match args.command {
                SpotCommands::Set { date, price } => {
                    assert_eq!(date, NaiveDate::from_ymd_opt(2025, 12, 5).unwrap());
                    assert_eq!(price, 24675.45);
                }
                _ => panic!("expected spot set"),
            },
            _ => panic!("expected spot"),
        }
    }

    #[test]
    fn test_rejects_unknown_section() {
        assert!(Cli::try_parse_from(["oi-analyzer", "show", "--section", "bogus"]).is_err());
    }

    #[test]
    fn test_limit_dates_keeps_newest_blocks() {
        let d5 = NaiveDate::from_ymd_opt(2025, 12, 5).unwrap();
        let d4 = NaiveDate::from_ymd_opt(2025, 12, 4).unwrap();
        let records: Vec<DerivedRecord> = [d5, d5, d4, d4]
            .iter()
            .map(|d| {
                DerivedRecord::from_raw(OpenInterestRecord::zeroed(
                    *d,
                    crate::models::ClientType::Client,
                ))
            })
            .collect();

        assert_eq!(limit_dates(&records, None).len(), 4);
        assert_eq!(limit_dates(&records, Some(1)).len(), 2);
        assert_eq!(limit_dates(&records, Some(2)).len(), 4);
        assert_eq!(limit_dates(&records, Some(9)).len(), 4);
    }
}
