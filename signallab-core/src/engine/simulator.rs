//! Signal replay — walks the transition sequence bar by bar and trades one unit.
//!
//! Positive transition while FLAT buys at the bar's close; negative transition
//! while LONG sells at the bar's close. Everything else is a no-op. An open
//! position at the end of the series is left open and is not marked to market.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::account::{Account, OpenPosition};
use crate::domain::{PriceSeries, Trade};
use crate::strategy::SignalTable;

/// Outcome of a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub initial_cash: f64,
    /// Cash only; an unclosed position is not valued.
    pub final_cash: f64,
    pub trade_log: Vec<Trade>,
    pub open_position: Option<OpenPosition>,
    /// Transition bars that could not trade: close missing or not positive.
    pub skipped_bars: Vec<usize>,
}

impl SimulationResult {
    pub fn buy_count(&self) -> usize {
        self.trade_log.iter().filter(|t| t.is_buy()).count()
    }

    pub fn sell_count(&self) -> usize {
        self.trade_log.iter().filter(|t| t.is_sell()).count()
    }

    /// Sum of realized profits over closed round trips.
    pub fn realized_profit(&self) -> f64 {
        self.trade_log.iter().filter_map(|t| t.profit).sum()
    }
}

/// Single-instrument, one-unit backtest simulator.
#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    initial_cash: f64,
}

impl Simulator {
    pub fn new(initial_cash: f64) -> Self {
        Self { initial_cash }
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    /// Replay `transitions` against `series`.
    ///
    /// `transitions[i]` applies to `series.bars()[i]`. A shorter transition
    /// slice is padded with zeros; extra entries are ignored.
    pub fn run(&self, series: &PriceSeries, transitions: &[i8]) -> SimulationResult {
        let mut account = Account::new(self.initial_cash);
        let mut trade_log = Vec::new();
        let mut skipped_bars = Vec::new();

        for bar in series.bars() {
            let transition = transitions.get(bar.index).copied().unwrap_or(0);
            if transition == 0 {
                continue;
            }

            // A zero or negative close would give an infinite or NaN return.
            let Some(price) = bar.close.filter(|p| *p > 0.0) else {
                warn!(
                    index = bar.index,
                    date = %bar.date,
                    close = ?bar.close,
                    transition,
                    "unusable close at transition bar, skipping"
                );
                skipped_bars.push(bar.index);
                continue;
            };

            let trade = if transition > 0 {
                account.buy(price, bar.index, bar.date)
            } else {
                account.sell(price, bar.index, bar.date)
            };

            if let Some(trade) = trade {
                debug!(
                    side = trade.side.as_str(),
                    price = trade.price,
                    index = trade.index,
                    profit = ?trade.profit,
                    "trade"
                );
                trade_log.push(trade);
            }
        }

        SimulationResult {
            initial_cash: self.initial_cash,
            final_cash: account.cash(),
            trade_log,
            open_position: account.open_position(),
            skipped_bars,
        }
    }

    /// Replay the transitions of a computed signal table.
    pub fn run_table(&self, series: &PriceSeries, table: &SignalTable) -> SimulationResult {
        self.run(series, &table.transitions())
    }
}
