//! Common types used throughout ronda.
//!
//! This module defines the price table the index pipeline consumes and the
//! schema used to lift one out of a Polars DataFrame.

use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::calendar::Calendar;
use crate::error::{IndexError, Result};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A stock identifier, typically the column name in the source table
/// (e.g. `"Stock_A"`).
pub type StockId = String;

/// Days from 0001-01-01 (CE) to 1970-01-01, the epoch of Polars `Date` columns.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Describes where the dates and stock prices live in a wide price frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Name of the date column
    pub date_column: String,
    /// chrono format used when the date column holds strings
    pub date_format: String,
    /// Only columns starting with this prefix are stocks; `None` takes every
    /// column other than the date column
    pub stock_prefix: Option<String>,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            stock_prefix: Some("Stock_".to_string()),
        }
    }
}

impl TableSchema {
    fn is_stock_column(&self, name: &str) -> bool {
        name != self.date_column
            && self
                .stock_prefix
                .as_deref()
                .is_none_or(|prefix| name.starts_with(prefix))
    }
}

/// Daily stock prices on a trading calendar.
///
/// Rows follow the calendar, columns follow `stocks` in load order. An absent
/// price is stored as `NaN`; every present price is finite and non-negative.
///
/// # Example
///
/// ```
/// use ronda_traits::{Date, PriceTable};
///
/// let d0 = Date::from_ymd_opt(2024, 1, 30).unwrap();
/// let d1 = Date::from_ymd_opt(2024, 1, 31).unwrap();
/// let table = PriceTable::from_rows(
///     vec!["Stock_A".to_string(), "Stock_B".to_string()],
///     vec![(d0, vec![Some(10.0), None]), (d1, vec![Some(11.0), Some(20.0)])],
/// )
/// .unwrap();
///
/// assert_eq!(table.price(0, 1), None);
/// assert_eq!(table.price(1, 1), Some(20.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    calendar: Calendar,
    stocks: Vec<StockId>,
    prices: Array2<f64>,
}

impl PriceTable {
    /// Creates a price table from a calendar, stock ids and a
    /// `dates x stocks` price matrix.
    pub fn new(calendar: Calendar, stocks: Vec<StockId>, prices: Array2<f64>) -> Result<Self> {
        if prices.dim() != (calendar.len(), stocks.len()) {
            return Err(IndexError::InvalidData(format!(
                "price matrix is {:?}, expected ({}, {})",
                prices.dim(),
                calendar.len(),
                stocks.len()
            )));
        }

        for (i, stock) in stocks.iter().enumerate() {
            if stocks[..i].contains(stock) {
                return Err(IndexError::InvalidData(format!(
                    "duplicate stock identifier: {stock}"
                )));
            }
        }

        if let Some(((t, s), p)) = prices
            .indexed_iter()
            .find(|(_, p)| p.is_finite() && **p < 0.0)
        {
            return Err(IndexError::InvalidData(format!(
                "negative price {p} for {} on {}",
                stocks[s],
                calendar.dates()[t]
            )));
        }

        // Infinities carry no usable price; store them as absent.
        let prices = prices.mapv(|p| if p.is_finite() { p } else { f64::NAN });

        Ok(Self {
            calendar,
            stocks,
            prices,
        })
    }

    /// Creates a price table from ascending `(date, prices)` rows.
    ///
    /// Each row must carry one entry per stock; `None` marks an absent price.
    pub fn from_rows<I>(stocks: Vec<StockId>, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Date, Vec<Option<f64>>)>,
    {
        let mut dates = Vec::new();
        let mut values = Vec::new();
        for (date, row) in rows {
            if row.len() != stocks.len() {
                return Err(IndexError::InvalidData(format!(
                    "row for {date} has {} prices, expected {}",
                    row.len(),
                    stocks.len()
                )));
            }
            dates.push(date);
            values.extend(row.into_iter().map(|p| p.unwrap_or(f64::NAN)));
        }

        let prices = Array2::from_shape_vec((dates.len(), stocks.len()), values)
            .map_err(|e| IndexError::InvalidData(e.to_string()))?;
        Self::new(Calendar::new(dates)?, stocks, prices)
    }

    /// Converts a wide price frame (one date column, one column per stock).
    ///
    /// Rows are sorted by date. Null cells become absent prices. String date
    /// columns are parsed with `schema.date_format`; Polars `Date` columns are
    /// used as is.
    pub fn from_dataframe(df: &DataFrame, schema: &TableSchema) -> Result<Self> {
        let date_col = df
            .column(&schema.date_column)
            .map_err(|_| IndexError::MissingColumn(schema.date_column.clone()))?
            .as_materialized_series();
        let raw_dates = parse_dates(date_col, &schema.date_format)?;

        let stocks: Vec<StockId> = df
            .get_column_names()
            .iter()
            .map(|s| s.as_str())
            .filter(|name| schema.is_stock_column(name))
            .map(str::to_string)
            .collect();

        let mut columns = Vec::with_capacity(stocks.len());
        for stock in &stocks {
            let series = df
                .column(stock)?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            let values: Vec<f64> = series
                .f64()?
                .into_iter()
                .map(|p: Option<f64>| p.unwrap_or(f64::NAN))
                .collect();
            columns.push(values);
        }

        let mut order: Vec<usize> = (0..raw_dates.len()).collect();
        order.sort_by_key(|&i| raw_dates[i]);

        let dates: Vec<Date> = order.iter().map(|&i| raw_dates[i]).collect();
        let prices = Array2::from_shape_fn((order.len(), stocks.len()), |(t, s)| {
            columns[s][order[t]]
        });

        Self::new(Calendar::new(dates)?, stocks, prices)
    }

    /// The trading calendar.
    pub const fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Stock identifiers in column order.
    pub fn stocks(&self) -> &[StockId] {
        &self.stocks
    }

    /// The raw `dates x stocks` price matrix (`NaN` where absent).
    pub const fn prices(&self) -> &Array2<f64> {
        &self.prices
    }

    /// Number of trading dates.
    pub fn n_dates(&self) -> usize {
        self.calendar.len()
    }

    /// Number of stocks.
    pub fn n_stocks(&self) -> usize {
        self.stocks.len()
    }

    /// Returns whether the table has no trading dates.
    pub fn is_empty(&self) -> bool {
        self.calendar.is_empty()
    }

    /// Price of stock column `stock` at calendar position `t`, if present.
    pub fn price(&self, t: usize, stock: usize) -> Option<f64> {
        self.prices.get((t, stock)).copied().filter(|p| p.is_finite())
    }

    /// Column index of a stock identifier.
    pub fn stock_index(&self, stock: &str) -> Option<usize> {
        self.stocks.iter().position(|s| s == stock)
    }
}

fn parse_dates(series: &Series, format: &str) -> Result<Vec<Date>> {
    match series.dtype() {
        DataType::Date => series
            .date()?
            .into_iter()
            .map(|d: Option<i32>| {
                d.and_then(|days| Date::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE))
                    .ok_or_else(|| IndexError::InvalidDate("null or out-of-range date".to_string()))
            })
            .collect(),
        DataType::String => series
            .str()?
            .into_iter()
            .map(|s: Option<&str>| {
                let s = s.ok_or_else(|| IndexError::InvalidDate("null date".to_string()))?;
                Date::parse_from_str(s.trim(), format)
                    .map_err(|e| IndexError::InvalidDate(format!("{s:?} ({format}): {e}")))
            })
            .collect(),
        other => Err(IndexError::InvalidDate(format!(
            "unsupported date column type: {other}"
        ))),
    }
}
