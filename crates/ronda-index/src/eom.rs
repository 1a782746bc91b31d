//! End-of-month anchor detection.

use ronda_traits::{Calendar, Date};

/// One flag per trading date, set on the latest trading date of each
/// calendar month present in the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EomFlags {
    flags: Vec<bool>,
}

impl EomFlags {
    /// The flags in calendar order.
    pub fn as_slice(&self) -> &[bool] {
        &self.flags
    }

    /// Whether position `t` is an anchor date.
    pub fn is_anchor(&self, t: usize) -> bool {
        self.flags.get(t).copied().unwrap_or(false)
    }

    /// Calendar positions of all anchor dates, ascending.
    pub fn anchors(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(t, &f)| f.then_some(t))
            .collect()
    }

    /// Anchor dates resolved against `calendar`.
    pub fn anchor_dates(&self, calendar: &Calendar) -> Vec<Date> {
        self.anchors()
            .into_iter()
            .filter_map(|t| calendar.get(t))
            .collect()
    }

    /// Number of flags, equal to the calendar length.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether there are no flags at all.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Flags the last trading date of every calendar month.
///
/// The calendar is ascending, so each month is a contiguous run and its last
/// member is the date whose successor falls in another month (or that has no
/// successor).
pub fn end_of_month_flags(calendar: &Calendar) -> EomFlags {
    let n = calendar.len();
    let flags = (0..n)
        .map(|t| t + 1 == n || !calendar.same_month(t, t + 1))
        .collect();
    EomFlags { flags }
}
