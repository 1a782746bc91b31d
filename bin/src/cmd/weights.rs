//! Weights command implementation.

use std::path::Path;

use anyhow::Result;
use ronda_index::IndexModel;
use ronda_traits::TableSchema;

use crate::data;

/// Print the allocation chosen on every month-end anchor date.
pub(crate) fn show_weights(prices: &Path, config: Option<&Path>) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Rebalancing Weights                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let config = data::load_config(config)?;
    let table = data::load_price_table(prices, &TableSchema::default())?;

    let mut model = IndexModel::new(table, config)?;
    model.compute_returns();
    let weights = model.compute_weights()?;

    let turnover = weights.turnover();
    for (rebalance, (_, one_way)) in weights.rebalances().iter().zip(&turnover) {
        println!(
            "{}  (total {:.2}, turnover {:>6.2}%)",
            rebalance.date,
            rebalance.total_weight(),
            one_way * 100.0
        );
        for (stock, weight) in &rebalance.allocation {
            println!("    {:<20} {:>6.2}%", stock, weight * 100.0);
        }
    }
    println!();

    Ok(())
}
