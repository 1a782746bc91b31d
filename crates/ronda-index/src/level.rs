//! Compounding of index returns into an index level series.

use ronda_traits::{Calendar, Date, IndexError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::IndexReturnSeries;

/// Index levels on the trading calendar.
///
/// Levels are defined from the start position onward; earlier dates are
/// `None` and left to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexLevelSeries {
    calendar: Calendar,
    levels: Vec<Option<f64>>,
    start: usize,
}

/// A single `(date, level)` observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelPoint {
    /// Trading date
    pub date: Date,
    /// Index level
    pub level: f64,
}

impl From<LevelPoint> for (Date, f64) {
    fn from(point: LevelPoint) -> Self {
        (point.date, point.level)
    }
}

impl IndexLevelSeries {
    /// The trading calendar.
    pub const fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Calendar position the series is anchored at.
    pub const fn start(&self) -> usize {
        self.start
    }

    /// The date the series is anchored at.
    pub fn start_date(&self) -> Option<Date> {
        self.calendar.get(self.start)
    }

    /// Level at calendar position `t`, `None` before the start position.
    pub fn get(&self, t: usize) -> Option<f64> {
        self.levels.get(t).copied().flatten()
    }

    /// Level on `date`, if it is a trading date at or after the start.
    pub fn level_on(&self, date: Date) -> Option<f64> {
        self.get(self.calendar.position(date)?)
    }

    /// All levels, `None` before the start position.
    pub fn levels(&self) -> &[Option<f64>] {
        &self.levels
    }

    /// Defined levels in calendar order.
    pub fn points(&self) -> Vec<LevelPoint> {
        self.calendar
            .dates()
            .iter()
            .zip(&self.levels)
            .filter_map(|(&date, level)| level.map(|level| LevelPoint { date, level }))
            .collect()
    }

    /// Defined levels dated within `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DateResolution`] when `end` precedes `start` or
    /// when no defined level falls inside the range.
    pub fn slice(&self, start: Date, end: Date) -> Result<Vec<LevelPoint>> {
        if end < start {
            return Err(IndexError::DateResolution(format!(
                "end date {end} is before start date {start}"
            )));
        }

        let points: Vec<LevelPoint> = self
            .points()
            .into_iter()
            .filter(|p| p.date >= start && p.date <= end)
            .collect();

        if points.is_empty() {
            let anchored = self
                .start_date()
                .map_or_else(|| "nothing".to_string(), |d| d.to_string());
            return Err(IndexError::DateResolution(format!(
                "no index levels between {start} and {end} (series anchored at {anchored})"
            )));
        }

        Ok(points)
    }
}

/// Compounds index returns forward from a base level.
#[derive(Debug, Clone, Copy)]
pub struct IndexLevelCompounder {
    base_level: f64,
}

impl Default for IndexLevelCompounder {
    fn default() -> Self {
        Self { base_level: 100.0 }
    }
}

impl IndexLevelCompounder {
    /// Create a compounder anchored at `base_level`.
    pub const fn new(base_level: f64) -> Self {
        Self { base_level }
    }

    /// The level assigned to the start date.
    pub const fn base_level(&self) -> f64 {
        self.base_level
    }

    /// Anchors the base level at `start` and compounds forward.
    ///
    /// A `start` that is not a trading date snaps to the next trading date,
    /// or to the last one when `start` lies beyond the calendar. Then
    /// `level[t] = level[t - 1] * (1 + index_return[t])` for every later date.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::EmptyCalendar`] if there are no trading dates.
    pub fn compound(&self, returns: &IndexReturnSeries, start: Date) -> Result<IndexLevelSeries> {
        let calendar = returns.calendar();
        let start_idx = calendar.resolve_forward(start)?;
        let resolved = calendar.dates()[start_idx];
        if resolved != start {
            info!(requested = %start, resolved = %resolved, "start date is not a trading date");
        }

        let mut levels = vec![None; calendar.len()];
        let mut level = self.base_level;
        levels[start_idx] = Some(level);
        for (t, slot) in levels.iter_mut().enumerate().skip(start_idx + 1) {
            level *= 1.0 + returns.values()[t];
            *slot = Some(level);
        }

        debug!(
            start = %resolved,
            dates = calendar.len() - start_idx,
            last = level,
            "compounded index levels"
        );

        Ok(IndexLevelSeries {
            calendar: calendar.clone(),
            levels,
            start: start_idx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::IndexReturnAggregator;
    use crate::eom::end_of_month_flags;
    use crate::returns::daily_returns;
    use crate::weights::WeightAllocator;
    use approx::assert_relative_eq;
    use ronda_traits::PriceTable;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    /// One stock held in full from 2024-01-31, doubling in price every day.
    fn doubling() -> IndexReturnSeries {
        let dates = [
            d(2024, 1, 31),
            d(2024, 2, 1),
            d(2024, 2, 2),
            d(2024, 2, 5),
            d(2024, 2, 6),
        ];
        let rows = dates
            .iter()
            .enumerate()
            .map(|(i, &date)| (date, vec![Some(2f64.powi(i as i32))]));
        let table = PriceTable::from_rows(vec!["A".to_string()], rows).unwrap();
        let flags = end_of_month_flags(table.calendar());
        let weights = WeightAllocator::new(vec![1.0]).allocate(&table, &flags);
        IndexReturnAggregator::default()
            .aggregate(&weights, &daily_returns(&table))
            .unwrap()
    }

    #[test]
    fn test_base_level_at_start() {
        let levels = IndexLevelCompounder::default()
            .compound(&doubling(), d(2024, 1, 31))
            .unwrap();
        assert_eq!(levels.get(0), Some(100.0));
        // Index returns are 0 on the first two dates, then 100%.
        assert_relative_eq!(levels.get(1).unwrap(), 100.0);
        assert_relative_eq!(levels.get(2).unwrap(), 200.0);
        assert_relative_eq!(levels.get(4).unwrap(), 800.0);
    }

    #[test]
    fn test_levels_before_start_are_undefined() {
        let levels = IndexLevelCompounder::default()
            .compound(&doubling(), d(2024, 2, 2))
            .unwrap();
        assert_eq!(levels.start(), 2);
        assert_eq!(levels.get(0), None);
        assert_eq!(levels.get(1), None);
        assert_eq!(levels.get(2), Some(100.0));
        assert_relative_eq!(levels.get(3).unwrap(), 200.0);
    }

    #[test]
    fn test_weekend_start_snaps_forward() {
        let levels = IndexLevelCompounder::default()
            .compound(&doubling(), d(2024, 2, 3))
            .unwrap();
        assert_eq!(levels.start_date(), Some(d(2024, 2, 5)));
        assert_eq!(levels.level_on(d(2024, 2, 5)), Some(100.0));
    }

    #[test]
    fn test_start_after_calendar_snaps_to_last() {
        let levels = IndexLevelCompounder::default()
            .compound(&doubling(), d(2030, 1, 1))
            .unwrap();
        assert_eq!(levels.start(), 4);
        assert_eq!(levels.points().len(), 1);
    }

    #[test]
    fn test_recompounding_from_new_start_is_not_incremental() {
        let returns = doubling();
        let compounder = IndexLevelCompounder::new(1000.0);
        let early = compounder.compound(&returns, d(2024, 1, 31)).unwrap();
        let late = compounder.compound(&returns, d(2024, 2, 5)).unwrap();
        assert_relative_eq!(early.level_on(d(2024, 2, 5)).unwrap(), 4000.0);
        assert_eq!(late.level_on(d(2024, 2, 5)), Some(1000.0));
        assert_relative_eq!(late.level_on(d(2024, 2, 6)).unwrap(), 2000.0);
    }

    #[test]
    fn test_slice() {
        let levels = IndexLevelCompounder::default()
            .compound(&doubling(), d(2024, 2, 1))
            .unwrap();

        let window = levels.slice(d(2024, 1, 1), d(2024, 2, 5)).unwrap();
        let dates: Vec<Date> = window.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 2, 1), d(2024, 2, 2), d(2024, 2, 5)]);

        assert!(matches!(
            levels.slice(d(2024, 2, 5), d(2024, 2, 1)),
            Err(IndexError::DateResolution(_))
        ));
        assert!(matches!(
            levels.slice(d(2024, 1, 1), d(2024, 1, 31)),
            Err(IndexError::DateResolution(_))
        ));
    }
}
