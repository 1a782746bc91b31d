//! Daily stock returns.

use ndarray::{Array2, ArrayView1};
use ronda_traits::{Calendar, PriceTable, StockId};
use tracing::debug;

/// Simple daily returns per stock on every trading date.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    calendar: Calendar,
    stocks: Vec<StockId>,
    returns: Array2<f64>,
}

impl ReturnSeries {
    /// The trading calendar.
    pub const fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Stock identifiers in column order.
    pub fn stocks(&self) -> &[StockId] {
        &self.stocks
    }

    /// The `dates x stocks` return matrix.
    pub const fn returns(&self) -> &Array2<f64> {
        &self.returns
    }

    /// Returns of every stock at calendar position `t`.
    pub fn row(&self, t: usize) -> ArrayView1<'_, f64> {
        self.returns.row(t)
    }

    /// Column index of a stock identifier.
    pub fn stock_index(&self, stock: &str) -> Option<usize> {
        self.stocks.iter().position(|s| s == stock)
    }
}

/// Computes `price[t] / price[t-1] - 1` for every stock.
///
/// The first date has no predecessor and returns 0. An absent price returns 0
/// on its own date; the next priced date is measured against the last valid
/// price before the gap, so the move across the gap is still counted. Where no
/// earlier price exists, or the earlier price is zero, the return is 0.
pub fn daily_returns(table: &PriceTable) -> ReturnSeries {
    let (n_dates, n_stocks) = (table.n_dates(), table.n_stocks());
    let mut returns = Array2::<f64>::zeros((n_dates, n_stocks));
    let mut gaps = 0usize;

    for s in 0..n_stocks {
        let mut last: Option<f64> = None;
        for t in 0..n_dates {
            let Some(curr) = table.price(t, s) else {
                if t > 0 {
                    gaps += 1;
                }
                continue;
            };
            if let Some(prev) = last.filter(|p| *p > 0.0) {
                returns[[t, s]] = curr / prev - 1.0;
            }
            last = Some(curr);
        }
    }

    debug!(dates = n_dates, stocks = n_stocks, gaps, "computed daily returns");

    ReturnSeries {
        calendar: table.calendar().clone(),
        stocks: table.stocks().to_vec(),
        returns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_traits::Date;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn table(rows: Vec<Vec<Option<f64>>>) -> PriceTable {
        let n = rows.first().map_or(0, Vec::len);
        let stocks = (0..n).map(|i| format!("S{i}")).collect();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, r)| (d(2024, 1, 1) + chrono::Duration::days(i as i64), r));
        PriceTable::from_rows(stocks, rows).unwrap()
    }

    #[test]
    fn test_first_date_is_zero() {
        let returns = daily_returns(&table(vec![
            vec![Some(10.0), Some(99.0)],
            vec![Some(11.0), Some(99.0)],
        ]));
        assert_eq!(returns.row(0).to_vec(), vec![0.0, 0.0]);
        assert_relative_eq!(returns.row(1)[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(returns.row(1)[1], 0.0);
    }

    #[test]
    fn test_gap_is_measured_from_last_price() {
        let returns = daily_returns(&table(vec![
            vec![Some(10.0)],
            vec![None],
            vec![Some(12.0)],
            vec![Some(15.0)],
        ]));
        let col: Vec<f64> = returns.returns().column(0).to_vec();
        assert_eq!(col[0], 0.0);
        assert_eq!(col[1], 0.0);
        assert_relative_eq!(col[2], 0.2, epsilon = 1e-12);
        assert_relative_eq!(col[3], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_leading_gap_gives_zero() {
        let returns = daily_returns(&table(vec![
            vec![None, Some(1.0)],
            vec![None, Some(1.0)],
            vec![Some(8.0), Some(1.0)],
            vec![Some(10.0), Some(1.0)],
        ]));
        let col: Vec<f64> = returns.returns().column(0).to_vec();
        assert_eq!(&col[..3], &[0.0, 0.0, 0.0]);
        assert_relative_eq!(col[3], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_previous_price_gives_zero() {
        let returns = daily_returns(&table(vec![vec![Some(0.0)], vec![Some(5.0)]]));
        assert_eq!(returns.row(1)[0], 0.0);
        assert!(returns.returns().iter().all(|r| r.is_finite()));
    }

    #[test]
    fn test_stock_index() {
        let returns = daily_returns(&table(vec![vec![Some(1.0), Some(2.0)]]));
        assert_eq!(returns.stock_index("S1"), Some(1));
        assert_eq!(returns.stock_index("S9"), None);
    }
}
