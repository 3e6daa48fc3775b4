//! OI Analyzer - NSE Participant Open Interest Analytics
//!
//! Computes daily derived metrics (day-over-day changes, long/short
//! ratios, market share percentages, NIFTY spot merge) from NSE
//! participant-wise open interest files, stores them in SQLite and
//! renders them as a sectioned table or CSV export.

pub mod cli;
pub mod db;
pub mod ingest;
pub mod engine;
pub mod provider;
pub mod services;
pub mod layout;
pub mod display;
pub mod models;
pub mod error;
pub mod state;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging, parse the command line and run the selected command
pub async fn run() -> error::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oi_analyzer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = cli::Cli::parse();
    cli::run(args).await
}
