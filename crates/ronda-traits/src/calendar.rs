//! Trading calendar.
//!
//! The calendar is the only ordering axis in the pipeline. Lags and
//! compounding are measured in calendar positions, so weekends and holidays
//! that never appear in the data do not count.

use chrono::Datelike;

use crate::error::{IndexError, Result};
use crate::types::Date;

/// An ordered, strictly increasing sequence of trading dates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Calendar {
    dates: Vec<Date>,
}

impl Calendar {
    /// Creates a calendar, rejecting duplicate or out-of-order dates.
    ///
    /// An empty calendar is allowed here; stages that need at least one date
    /// report [`IndexError::EmptyCalendar`] themselves.
    pub fn new(dates: Vec<Date>) -> Result<Self> {
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            let reason = if pair[0] == pair[1] {
                "duplicate trading date"
            } else {
                "trading dates out of order"
            };
            return Err(IndexError::InvalidData(format!(
                "{reason}: {} then {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self { dates })
    }

    /// Number of trading dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns whether the calendar has no dates.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The trading dates in ascending order.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// The date at position `i`.
    pub fn get(&self, i: usize) -> Option<Date> {
        self.dates.get(i).copied()
    }

    /// The first trading date.
    pub fn first(&self) -> Option<Date> {
        self.dates.first().copied()
    }

    /// The last trading date.
    pub fn last(&self) -> Option<Date> {
        self.dates.last().copied()
    }

    /// Exact position of `date`, if it is a trading date.
    pub fn position(&self, date: Date) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Resolves `date` to a calendar position, snapping forward.
    ///
    /// Returns the position of the first trading date at or after `date`.
    /// When `date` is later than every trading date, the last position is
    /// returned instead.
    pub fn resolve_forward(&self, date: Date) -> Result<usize> {
        if self.dates.is_empty() {
            return Err(IndexError::EmptyCalendar);
        }
        let idx = self.dates.partition_point(|d| *d < date);
        Ok(idx.min(self.dates.len() - 1))
    }

    /// Returns whether positions `i` and `j` fall in the same calendar month.
    pub fn same_month(&self, i: usize, j: usize) -> bool {
        match (self.dates.get(i), self.dates.get(j)) {
            (Some(a), Some(b)) => a.year() == b.year() && a.month() == b.month(),
            _ => false,
        }
    }
}

impl TryFrom<Vec<Date>> for Calendar {
    type Error = IndexError;

    fn try_from(dates: Vec<Date>) -> Result<Self> {
        Self::new(dates)
    }
}
