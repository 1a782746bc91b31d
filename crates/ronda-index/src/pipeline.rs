//! The index pipeline and its stage ordering.
//!
//! Each stage is a pure function over the price table or the outputs of
//! earlier stages. [`IndexModel`] drives them in order over one table and
//! refuses to run a stage whose inputs do not exist yet.

use std::fmt;

use ronda_traits::{Date, IndexError, PriceTable, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{IndexReturnAggregator, IndexReturnSeries};
use crate::config::IndexConfig;
use crate::eom::end_of_month_flags;
use crate::level::{IndexLevelCompounder, IndexLevelSeries};
use crate::returns::{ReturnSeries, daily_returns};
use crate::weights::{WeightAllocator, WeightSeries};

/// Progress of an [`IndexModel`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Nothing computed yet.
    Uninitialized,
    /// Daily stock returns exist.
    ReturnsComputed,
    /// Rebalancing weights exist.
    WeightsComputed,
    /// The index return series exists.
    IndexReturnComputed,
    /// Index levels have been compounded from a start date.
    Compounded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::ReturnsComputed => "returns computed",
            Self::WeightsComputed => "weights computed",
            Self::IndexReturnComputed => "index return computed",
            Self::Compounded => "compounded",
        };
        f.write_str(name)
    }
}

/// Runs the index pipeline over one price table.
///
/// # Example
///
/// ```
/// use ronda_index::{IndexConfig, IndexModel};
/// use ronda_traits::{Date, PriceTable};
///
/// let d = |m, day| Date::from_ymd_opt(2024, m, day).unwrap();
/// let stocks = vec!["Stock_A".to_string(), "Stock_B".to_string()];
/// let table = PriceTable::from_rows(
///     stocks,
///     vec![
///         (d(1, 31), vec![Some(10.0), Some(20.0)]),
///         (d(2, 1), vec![Some(11.0), Some(20.0)]),
///         (d(2, 2), vec![Some(12.0), Some(22.0)]),
///     ],
/// )?;
///
/// let mut model = IndexModel::new(table, IndexConfig::default())?;
/// let levels = model.calc_index_level(d(1, 31), d(2, 2))?;
/// assert_eq!(levels[0], (d(1, 31), 100.0));
/// # Ok::<(), ronda_traits::IndexError>(())
/// ```
#[derive(Debug, Clone)]
pub struct IndexModel {
    table: PriceTable,
    config: IndexConfig,
    stage: Stage,
    returns: Option<ReturnSeries>,
    weights: Option<WeightSeries>,
    index_returns: Option<IndexReturnSeries>,
    levels: Option<IndexLevelSeries>,
}

impl IndexModel {
    /// Create a model over `table`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::EmptyCalendar`] for a table without dates and
    /// [`IndexError::InvalidConfig`] for an unusable configuration.
    pub fn new(table: PriceTable, config: IndexConfig) -> Result<Self> {
        if table.is_empty() {
            return Err(IndexError::EmptyCalendar);
        }
        config.validate()?;

        debug!(
            dates = table.n_dates(),
            stocks = table.n_stocks(),
            "created index model"
        );

        Ok(Self {
            table,
            config,
            stage: Stage::Uninitialized,
            returns: None,
            weights: None,
            index_returns: None,
            levels: None,
        })
    }

    /// The price table.
    pub const fn table(&self) -> &PriceTable {
        &self.table
    }

    /// The configuration.
    pub const fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Current stage of the run.
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Daily returns, once computed.
    pub const fn returns(&self) -> Option<&ReturnSeries> {
        self.returns.as_ref()
    }

    /// Rebalancing weights, once computed.
    pub const fn weights(&self) -> Option<&WeightSeries> {
        self.weights.as_ref()
    }

    /// Index returns, once computed.
    pub const fn index_returns(&self) -> Option<&IndexReturnSeries> {
        self.index_returns.as_ref()
    }

    /// Index levels from the latest compounding, if any.
    pub const fn levels(&self) -> Option<&IndexLevelSeries> {
        self.levels.as_ref()
    }

    fn require(&self, stage: &'static str, needed: Stage) -> Result<()> {
        if self.stage < needed {
            return Err(IndexError::MissingDependency {
                stage,
                requires: format!("stage '{needed}', model is at '{}'", self.stage),
            });
        }
        Ok(())
    }

    /// Moves the run to `stage`, dropping outputs of later stages.
    fn enter(&mut self, stage: Stage) {
        if stage < Stage::Compounded {
            self.levels = None;
        }
        if stage < Stage::IndexReturnComputed {
            self.index_returns = None;
        }
        if stage < Stage::WeightsComputed {
            self.weights = None;
        }
        self.stage = stage;
    }

    /// Computes daily stock returns.
    pub fn compute_returns(&mut self) -> &ReturnSeries {
        self.enter(Stage::ReturnsComputed);
        &*self.returns.insert(daily_returns(&self.table))
    }

    /// Computes month-end anchors and the weights they assign.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::MissingDependency`] before returns are computed.
    pub fn compute_weights(&mut self) -> Result<&WeightSeries> {
        self.require("compute_weights", Stage::ReturnsComputed)?;
        self.enter(Stage::WeightsComputed);

        let flags = end_of_month_flags(self.table.calendar());
        let weights =
            WeightAllocator::from_config(&self.config).allocate(&self.table, &flags);
        Ok(&*self.weights.insert(weights))
    }

    /// Combines T-2 weights with daily returns into the index return.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::MissingDependency`] before weights are computed.
    pub fn compute_index_returns(&mut self) -> Result<&IndexReturnSeries> {
        self.require("compute_index_returns", Stage::WeightsComputed)?;
        let (Some(weights), Some(returns)) = (&self.weights, &self.returns) else {
            return Err(IndexError::MissingDependency {
                stage: "compute_index_returns",
                requires: "daily returns and weights".to_string(),
            });
        };

        let index_returns = IndexReturnAggregator::default().aggregate(weights, returns)?;
        self.enter(Stage::IndexReturnComputed);
        Ok(&*self.index_returns.insert(index_returns))
    }

    /// Runs every stage up to the index return.
    pub fn run(&mut self) -> Result<&IndexReturnSeries> {
        self.compute_returns();
        self.compute_weights()?;
        self.compute_index_returns()
    }

    /// Compounds index levels anchored at `start`.
    ///
    /// Every call recompounds the full series from its own start date.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::MissingDependency`] before index returns exist.
    pub fn compound(&mut self, start: Date) -> Result<&IndexLevelSeries> {
        self.require("compound", Stage::IndexReturnComputed)?;
        let Some(index_returns) = &self.index_returns else {
            return Err(IndexError::MissingDependency {
                stage: "compound",
                requires: "index returns".to_string(),
            });
        };

        let levels =
            IndexLevelCompounder::new(self.config.base_level).compound(index_returns, start)?;
        self.enter(Stage::Compounded);
        Ok(&*self.levels.insert(levels))
    }

    /// Index levels between `start` and `end`, running any missing stage.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DateResolution`] when the range is inverted or
    /// holds no levels.
    pub fn calc_index_level(&mut self, start: Date, end: Date) -> Result<Vec<(Date, f64)>> {
        if end < start {
            return Err(IndexError::DateResolution(format!(
                "end date {end} is before start date {start}"
            )));
        }
        if self.stage < Stage::IndexReturnComputed {
            self.run()?;
        }

        let points = self.compound(start)?.slice(start, end)?;
        info!(
            start = %start,
            end = %end,
            points = points.len(),
            "calculated index levels"
        );
        Ok(points.into_iter().map(Into::into).collect())
    }
}

/// Weights in effect on every trading date, using the default configuration.
///
/// # Errors
///
/// Returns [`IndexError::EmptyCalendar`] for a table without dates.
pub fn compute_weights(table: &PriceTable) -> Result<WeightSeries> {
    if table.is_empty() {
        return Err(IndexError::EmptyCalendar);
    }
    let flags = end_of_month_flags(table.calendar());
    Ok(WeightAllocator::default().allocate(table, &flags))
}

/// Index levels over `[start, end]`, using the default configuration.
///
/// # Errors
///
/// See [`IndexModel::new`] and [`IndexModel::calc_index_level`].
pub fn compute_index_levels(
    table: &PriceTable,
    start: Date,
    end: Date,
) -> Result<Vec<(Date, f64)>> {
    IndexModel::new(table.clone(), IndexConfig::default())?.calc_index_level(start, end)
}
