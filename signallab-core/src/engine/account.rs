//! Account state — cash plus a single-unit FLAT/LONG position.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Trade;

/// An open one-unit long position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub entry_price: f64,
    pub entry_index: usize,
}

/// Two-state position machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PositionState {
    Flat,
    Long(OpenPosition),
}

/// Cash and position owned by the simulator for the duration of a run.
#[derive(Debug, Clone)]
pub struct Account {
    cash: f64,
    state: PositionState,
}

impl Account {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            state: PositionState::Flat,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    pub fn is_long(&self) -> bool {
        matches!(self.state, PositionState::Long(_))
    }

    pub fn open_position(&self) -> Option<OpenPosition> {
        match self.state {
            PositionState::Long(pos) => Some(pos),
            PositionState::Flat => None,
        }
    }

    /// Buy one unit at `price`. A no-op returning `None` while already long.
    pub fn buy(&mut self, price: f64, index: usize, date: NaiveDate) -> Option<Trade> {
        if self.is_long() {
            return None;
        }
        self.cash -= price;
        self.state = PositionState::Long(OpenPosition {
            entry_price: price,
            entry_index: index,
        });
        Some(Trade::buy(price, index, date))
    }

    /// Sell the open unit at `price`. A no-op returning `None` while flat.
    pub fn sell(&mut self, price: f64, index: usize, date: NaiveDate) -> Option<Trade> {
        let PositionState::Long(pos) = self.state else {
            return None;
        };
        self.cash += price;
        self.state = PositionState::Flat;
        Some(Trade::sell(price, index, date, pos.entry_price))
    }
}
