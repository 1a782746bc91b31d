//! Summary command implementation.

use std::path::Path;

use anyhow::{Result, anyhow};
use ronda_index::{IndexModel, IndexSummary};
use ronda_traits::TableSchema;

use crate::data;

/// Print performance statistics of the index over a date range.
pub(crate) fn show_summary(
    prices: &Path,
    config: Option<&Path>,
    start: &str,
    end: &str,
    format: &str,
) -> Result<()> {
    let start_date = data::parse_date(start)?;
    let end_date = data::parse_date(end)?;

    let config = data::load_config(config)?;
    let table = data::load_price_table(prices, &TableSchema::default())?;

    let mut model = IndexModel::new(table, config)?;
    model.run()?;
    let window = model.compound(start_date)?.slice(start_date, end_date)?;
    let summary = IndexSummary::from_points(&window)
        .ok_or_else(|| anyhow!("no index levels between {start_date} and {end_date}"))?;

    if format == "json" {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| anyhow!("JSON serialization error: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                        Index Summary                         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!(
        "Period:   {} to {} ({} trading dates)",
        summary.start_date, summary.end_date, summary.n_obs
    );
    println!();
    println!("Levels:");
    println!("  Start Level:       {:>10.2}", summary.start_level);
    println!("  End Level:         {:>10.2}", summary.end_level);
    println!();
    println!("Performance Metrics:");
    println!(
        "  Total Return:      {:>10.2}%",
        summary.total_return * 100.0
    );
    println!(
        "  Annualized Return: {:>10.2}%",
        summary.annualized_return * 100.0
    );
    println!(
        "  Annualized Vol:    {:>10.2}%",
        summary.annualized_volatility * 100.0
    );
    println!("  Sharpe Ratio:      {:>10.2}", summary.sharpe_ratio);
    println!(
        "  Max Drawdown:      {:>10.2}%",
        summary.max_drawdown * 100.0
    );
    println!();

    Ok(())
}
