//! Data loading and export for the ronda CLI.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use polars::prelude::*;
use ronda_index::IndexConfig;
use ronda_traits::{IndexError, PriceTable, TableSchema};
use tracing::{debug, info};

/// Load a wide price CSV into a price table.
///
/// The file is expected to have a header row, a date column and one column
/// per stock, as described by `schema`. Empty cells become absent prices.
/// Column types are inferred from the whole file, so a price column that only
/// turns fractional late in the file still loads as floats.
pub(crate) fn load_price_table(path: &Path, schema: &TableSchema) -> Result<PriceTable, IndexError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(rows = df.height(), columns = df.width(), "read price csv");

    let table = PriceTable::from_dataframe(&df, schema)?;
    info!(
        path = %path.display(),
        dates = table.n_dates(),
        stocks = table.n_stocks(),
        "loaded price table"
    );
    Ok(table)
}

/// Read an index configuration from a JSON file, or use the defaults.
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<IndexConfig> {
    let Some(path) = path else {
        return Ok(IndexConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: IndexConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Write `(date, level)` pairs as a `Date,Index_Level` CSV.
pub(crate) fn export_levels(path: &Path, levels: &[(NaiveDate, f64)]) -> anyhow::Result<()> {
    let dates: Vec<String> = levels.iter().map(|(d, _)| d.format("%Y-%m-%d").to_string()).collect();
    let values: Vec<f64> = levels.iter().map(|(_, l)| *l).collect();

    let mut df = df! {
        "Date" => dates,
        "Index_Level" => values,
    }?;

    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;

    info!(path = %path.display(), rows = levels.len(), "exported index levels");
    Ok(())
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate, IndexError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| IndexError::InvalidDate(format!("{date_str:?}: {e}")))
}
