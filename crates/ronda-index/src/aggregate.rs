//! Lagged weighted aggregation of stock returns into the index return.

use ndarray::Array1;
use ronda_traits::{Calendar, Date, IndexError, Result};
use tracing::debug;

use crate::config::RETURN_LAG;
use crate::returns::ReturnSeries;
use crate::weights::WeightSeries;

/// The index's own daily return on every trading date.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexReturnSeries {
    calendar: Calendar,
    values: Array1<f64>,
}

impl IndexReturnSeries {
    /// The trading calendar.
    pub const fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Index returns in calendar order.
    pub const fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Index return at calendar position `t`.
    pub fn get(&self, t: usize) -> Option<f64> {
        self.values.get(t).copied()
    }

    /// `(date, return)` pairs in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.calendar
            .dates()
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no dates.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Combines the weights held `lag` trading dates earlier with today's stock
/// returns.
#[derive(Debug, Clone, Copy)]
pub struct IndexReturnAggregator {
    lag: usize,
}

impl Default for IndexReturnAggregator {
    fn default() -> Self {
        Self { lag: RETURN_LAG }
    }
}

impl IndexReturnAggregator {
    /// The lag in trading-calendar positions.
    pub const fn lag(&self) -> usize {
        self.lag
    }

    /// Computes `sum_s weight[t - lag][s] * return[t][s]` for each date.
    ///
    /// The first `lag` dates have no lagged weights and are 0. Weights are
    /// matched to returns by stock identifier; returns of stocks the weight
    /// series does not know contribute nothing.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::MissingDependency`] if the return series does not
    /// cover the weights' calendar or lacks a stock that carries weight.
    pub fn aggregate(
        &self,
        weights: &WeightSeries,
        returns: &ReturnSeries,
    ) -> Result<IndexReturnSeries> {
        if weights.calendar() != returns.calendar() {
            return Err(IndexError::MissingDependency {
                stage: "index_returns",
                requires: format!(
                    "daily returns on the weights' calendar ({} dates, got {})",
                    weights.calendar().len(),
                    returns.calendar().len()
                ),
            });
        }

        // Align weight columns to return columns.
        let columns = weights
            .stocks()
            .iter()
            .map(|stock| {
                returns
                    .stock_index(stock)
                    .ok_or_else(|| IndexError::MissingDependency {
                        stage: "index_returns",
                        requires: format!("daily returns for {stock}"),
                    })
            })
            .collect::<Result<Vec<usize>>>()?;

        let n = weights.calendar().len();
        let mut values = Array1::<f64>::zeros(n);
        for t in self.lag..n {
            let held = weights.row(t - self.lag);
            let today = returns.row(t);
            values[t] = held
                .iter()
                .zip(&columns)
                .map(|(&w, &c)| w * today[c])
                .sum::<f64>();
        }

        debug!(dates = n, lag = self.lag, "aggregated index returns");

        Ok(IndexReturnSeries {
            calendar: weights.calendar().clone(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eom::end_of_month_flags;
    use crate::returns::daily_returns;
    use crate::weights::WeightAllocator;
    use approx::assert_relative_eq;
    use ronda_traits::PriceTable;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(table: &PriceTable) -> (WeightSeries, ReturnSeries) {
        let flags = end_of_month_flags(table.calendar());
        let weights = WeightAllocator::new(vec![0.5, 0.5]).allocate(table, &flags);
        (weights, daily_returns(table))
    }

    #[test]
    fn test_offsetting_returns_cancel() {
        // d0 is a month end, so {A: 0.5, B: 0.5} holds from d0 onward.
        let table = PriceTable::from_rows(
            vec!["A".to_string(), "B".to_string()],
            vec![
                (d(2024, 1, 31), vec![Some(100.0), Some(100.0)]),
                (d(2024, 2, 1), vec![Some(100.0), Some(100.0)]),
                (d(2024, 2, 2), vec![Some(110.0), Some(90.0)]),
                (d(2024, 2, 5), vec![Some(110.0), Some(90.0)]),
            ],
        )
        .unwrap();
        let (weights, returns) = series(&table);

        let index = IndexReturnAggregator::default()
            .aggregate(&weights, &returns)
            .unwrap();
        assert_relative_eq!(index.get(2).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uses_weights_two_positions_back() {
        // Weights switch from A to B on 2024-02-29; the switch reaches the
        // index return two trading dates later, skipping the weekend.
        let table = PriceTable::from_rows(
            vec!["A".to_string(), "B".to_string()],
            vec![
                (d(2024, 1, 31), vec![Some(2.0), Some(1.0)]),
                (d(2024, 2, 28), vec![Some(2.0), Some(1.0)]),
                (d(2024, 2, 29), vec![Some(1.0), Some(2.0)]),
                (d(2024, 3, 1), vec![Some(2.0), Some(4.0)]),
                (d(2024, 3, 4), vec![Some(4.0), Some(4.0)]),
            ],
        )
        .unwrap();
        let flags = end_of_month_flags(table.calendar());
        let weights = WeightAllocator::new(vec![1.0]).allocate(&table, &flags);
        let returns = daily_returns(&table);

        let index = IndexReturnAggregator::default()
            .aggregate(&weights, &returns)
            .unwrap();
        // t=2 uses weights of t=0 (all A): A went 2 -> 1
        assert_relative_eq!(index.get(2).unwrap(), -0.5);
        // t=3 uses weights of t=1 (still A): A went 1 -> 2
        assert_relative_eq!(index.get(3).unwrap(), 1.0);
        // t=4 uses weights of t=2 (all B): B went 4 -> 4
        assert_relative_eq!(index.get(4).unwrap(), 0.0);
    }

    #[test]
    fn test_first_two_dates_are_zero() {
        let table = PriceTable::from_rows(
            vec!["A".to_string(), "B".to_string()],
            vec![
                (d(2024, 1, 31), vec![Some(1.0), Some(1.0)]),
                (d(2024, 2, 1), vec![Some(5.0), Some(7.0)]),
            ],
        )
        .unwrap();
        let (weights, returns) = series(&table);
        let index = IndexReturnAggregator::default()
            .aggregate(&weights, &returns)
            .unwrap();
        assert_eq!(index.values().to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_missing_stock_returns_is_dependency_error() {
        let full = PriceTable::from_rows(
            vec!["A".to_string(), "B".to_string()],
            vec![(d(2024, 1, 31), vec![Some(1.0), Some(1.0)])],
        )
        .unwrap();
        let partial = PriceTable::from_rows(
            vec!["A".to_string()],
            vec![(d(2024, 1, 31), vec![Some(1.0)])],
        )
        .unwrap();

        let (weights, _) = series(&full);
        let err = IndexReturnAggregator::default()
            .aggregate(&weights, &daily_returns(&partial))
            .unwrap_err();
        assert!(
            matches!(err, IndexError::MissingDependency { ref requires, .. } if requires.contains('B'))
        );
    }

    #[test]
    fn test_calendar_mismatch_is_dependency_error() {
        let table = PriceTable::from_rows(
            vec!["A".to_string()],
            vec![
                (d(2024, 1, 30), vec![Some(1.0)]),
                (d(2024, 1, 31), vec![Some(1.0)]),
            ],
        )
        .unwrap();
        let shorter =
            PriceTable::from_rows(vec!["A".to_string()], vec![(d(2024, 1, 30), vec![Some(1.0)])])
                .unwrap();

        let (weights, _) = series(&table);
        let err = IndexReturnAggregator::default()
            .aggregate(&weights, &daily_returns(&shorter))
            .unwrap_err();
        assert!(matches!(err, IndexError::MissingDependency { .. }));
    }
}
