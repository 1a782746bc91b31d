//! Levels command implementation.

use std::path::Path;

use anyhow::Result;
use ronda_index::IndexModel;
use ronda_traits::TableSchema;

use crate::data;

/// Compute index levels over a date range and print or export them.
pub(crate) fn run_levels(
    prices: &Path,
    config: Option<&Path>,
    start: &str,
    end: &str,
    output: Option<&Path>,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                        Index Levels                          ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let start_date = data::parse_date(start)?;
    let end_date = data::parse_date(end)?;

    println!("Prices:   {}", prices.display());
    println!("Period:   {} to {}", start_date, end_date);

    let config = data::load_config(config)?;
    let table = data::load_price_table(prices, &TableSchema::default())?;
    println!(
        "Loaded {} trading dates for {} stocks",
        table.n_dates(),
        table.n_stocks()
    );
    println!();

    let mut model = IndexModel::new(table, config)?;
    let levels = model.calc_index_level(start_date, end_date)?;

    if let Some(output) = output {
        data::export_levels(output, &levels)?;
        println!("Index values exported to {}", output.display());
        return Ok(());
    }

    println!("{:<12} {:>14}", "Date", "Index_Level");
    println!("{}", "-".repeat(27));
    for (date, level) in &levels {
        println!("{:<12} {:>14.6}", date.to_string(), level);
    }
    println!();

    Ok(())
}
