//! ronda CLI binary.
//!
//! Loads a daily price table from CSV and runs the month-end rank-weighted
//! index over it.

mod cmd;
mod data;

use std::path::PathBuf;
use std::process;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ronda")]
#[command(about = "Month-end rank-weighted equity index", long_about = None)]
#[command(version)]
struct Cli {
    /// Price CSV: a `Date` column (dd/mm/yyyy) and one `Stock_*` column per stock
    #[arg(short, long, env = "RONDA_PRICES", global = true)]
    prices: Option<PathBuf>,

    /// JSON index configuration (tier weights, base level)
    #[arg(short, long, env = "RONDA_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute index levels over a date range
    Levels {
        /// Start date (YYYY-MM-DD); the index is 100 on this date
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Write `Date,Index_Level` CSV here instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the allocation chosen on each month-end anchor date
    Weights,

    /// Show performance statistics over a date range
    Summary {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() {
    // Optional .env with RONDA_PRICES / RONDA_CONFIG / RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ronda=info,ronda_index=info,ronda_traits=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let prices = cli
        .prices
        .ok_or_else(|| anyhow!("no price file given (use --prices or RONDA_PRICES)"))?;
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Levels { start, end, output } => {
            cmd::levels::run_levels(&prices, config, &start, &end, output.as_deref())?;
        }
        Commands::Weights => {
            cmd::weights::show_weights(&prices, config)?;
        }
        Commands::Summary { start, end, format } => {
            cmd::summary::show_summary(&prices, config, &start, &end, &format)?;
        }
    }

    Ok(())
}
