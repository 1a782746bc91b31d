//! Rank-based weight allocation on month-end anchor dates.
//!
//! On every anchor the stocks with a price are ranked by price, highest
//! first, and the configured tier weights are handed out down the ranking.
//! The allocation then holds for every date up to the next anchor.
//!
//! Ties in price keep stock load order: the ranking is a stable sort on
//! price, so of two stocks priced alike the one loaded first ranks higher.
//! Stocks without a price on the anchor date are left out of the ranking and
//! carry zero weight. Weights are never renormalized, so fewer ranked stocks
//! than tiers leaves part of the allocation unassigned.

use ndarray::{Array1, Array2, ArrayView1};
use ronda_traits::{Calendar, Date, PriceTable, StockId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::IndexConfig;
use crate::eom::EomFlags;

/// Allocation decided on one anchor date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rebalance {
    /// Anchor date
    pub date: Date,
    /// Stocks with non-zero weight, best rank first
    pub allocation: Vec<(StockId, f64)>,
}

impl Rebalance {
    /// Sum of weights in this allocation.
    pub fn total_weight(&self) -> f64 {
        self.allocation.iter().map(|(_, w)| w).sum()
    }
}

/// Weights in effect on every trading date.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSeries {
    calendar: Calendar,
    stocks: Vec<StockId>,
    weights: Array2<f64>,
    anchors: Vec<usize>,
}

impl WeightSeries {
    /// The trading calendar.
    pub const fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Stock identifiers in column order.
    pub fn stocks(&self) -> &[StockId] {
        &self.stocks
    }

    /// The `dates x stocks` weight matrix.
    pub const fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Weights in effect at calendar position `t`.
    pub fn row(&self, t: usize) -> ArrayView1<'_, f64> {
        self.weights.row(t)
    }

    /// Calendar positions of the anchor dates.
    pub fn anchors(&self) -> &[usize] {
        &self.anchors
    }

    /// Weights in effect on `date`, per stock in column order.
    ///
    /// Returns `None` when `date` is not a trading date.
    pub fn allocation_at(&self, date: Date) -> Option<Vec<(StockId, f64)>> {
        let t = self.calendar.position(date)?;
        Some(
            self.stocks
                .iter()
                .cloned()
                .zip(self.weights.row(t).iter().copied())
                .collect(),
        )
    }

    /// The allocation chosen on each anchor date.
    pub fn rebalances(&self) -> Vec<Rebalance> {
        self.anchors
            .iter()
            .filter_map(|&t| {
                let date = self.calendar.get(t)?;
                let mut allocation: Vec<(StockId, f64)> = self
                    .stocks
                    .iter()
                    .zip(self.weights.row(t).iter())
                    .filter(|(_, w)| **w > 0.0)
                    .map(|(s, &w)| (s.clone(), w))
                    .collect();
                allocation.sort_by(|a, b| b.1.total_cmp(&a.1));
                Some(Rebalance { date, allocation })
            })
            .collect()
    }

    /// One-way turnover at each anchor date.
    ///
    /// Half the absolute change in weights between the day before the anchor
    /// and the anchor itself. The first anchor is measured against an empty
    /// portfolio.
    pub fn turnover(&self) -> Vec<(Date, f64)> {
        let empty = Array1::<f64>::zeros(self.stocks.len());
        self.anchors
            .iter()
            .filter_map(|&t| {
                let date = self.calendar.get(t)?;
                let before = if t == 0 {
                    empty.view()
                } else {
                    self.weights.row(t - 1)
                };
                let change: f64 = before
                    .iter()
                    .zip(self.weights.row(t).iter())
                    .map(|(&old, &new)| (new - old).abs())
                    .sum();
                Some((date, change / 2.0))
            })
            .collect()
    }
}

/// Assigns tiered weights by price rank on anchor dates.
#[derive(Debug, Clone)]
pub struct WeightAllocator {
    tier_weights: Vec<f64>,
}

impl WeightAllocator {
    /// Create an allocator with explicit tier weights, highest price first.
    pub const fn new(tier_weights: Vec<f64>) -> Self {
        Self { tier_weights }
    }

    /// Create an allocator using the tiers of an index configuration.
    pub fn from_config(config: &IndexConfig) -> Self {
        Self::new(config.tier_weights.clone())
    }

    /// The tier weights, highest price first.
    pub fn tier_weights(&self) -> &[f64] {
        &self.tier_weights
    }

    /// Stock columns with a price at position `t`, ranked by price descending.
    ///
    /// Equal prices keep column order.
    pub fn rank(&self, table: &PriceTable, t: usize) -> Vec<usize> {
        let mut priced: Vec<(usize, f64)> = (0..table.n_stocks())
            .filter_map(|s| table.price(t, s).map(|p| (s, p)))
            .collect();
        // sort_by is stable
        priced.sort_by(|a, b| b.1.total_cmp(&a.1));
        priced.into_iter().map(|(s, _)| s).collect()
    }

    /// Weights for one anchor date.
    fn allocate_anchor(&self, table: &PriceTable, t: usize) -> Array1<f64> {
        let mut row = Array1::zeros(table.n_stocks());
        let ranked = self.rank(table, t);

        if ranked.len() < self.tier_weights.len() {
            warn!(
                date = %table.calendar().dates()[t],
                ranked = ranked.len(),
                tiers = self.tier_weights.len(),
                "fewer priced stocks than weight tiers, allocation sums below full weight"
            );
        }

        for (&s, &w) in ranked.iter().zip(self.tier_weights.iter()) {
            row[s] = w;
        }
        row
    }

    /// Computes the weights in effect on every trading date.
    ///
    /// Dates before the first anchor carry zero weight.
    pub fn allocate(&self, table: &PriceTable, flags: &EomFlags) -> WeightSeries {
        let (n_dates, n_stocks) = (table.n_dates(), table.n_stocks());
        let mut weights = Array2::zeros((n_dates, n_stocks));
        let mut current = Array1::<f64>::zeros(n_stocks);
        let mut anchors = Vec::new();

        for t in 0..n_dates {
            if flags.is_anchor(t) {
                current = self.allocate_anchor(table, t);
                anchors.push(t);
            }
            weights.row_mut(t).assign(&current);
        }

        debug!(
            dates = n_dates,
            stocks = n_stocks,
            anchors = anchors.len(),
            "allocated weights"
        );

        WeightSeries {
            calendar: table.calendar().clone(),
            stocks: table.stocks().to_vec(),
            weights,
            anchors,
        }
    }
}

impl Default for WeightAllocator {
    fn default() -> Self {
        Self::from_config(&IndexConfig::default())
    }
}
