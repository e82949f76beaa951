//! Trade — one entry in the simulator's trade log.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Side of a simulated trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

/// A single fill of one unit at a bar's close.
///
/// `profit` is only present on sells: the sell price minus the price of the
/// buy it closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub price: f64,
    pub index: usize,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit: Option<f64>,
}

impl Trade {
    pub fn buy(price: f64, index: usize, date: NaiveDate) -> Self {
        Self {
            side: TradeSide::Buy,
            price,
            index,
            date,
            profit: None,
        }
    }

    pub fn sell(price: f64, index: usize, date: NaiveDate, entry_price: f64) -> Self {
        Self {
            side: TradeSide::Sell,
            price,
            index,
            date,
            profit: Some(price - entry_price),
        }
    }

    pub fn is_buy(&self) -> bool {
        self.side == TradeSide::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == TradeSide::Sell
    }
}
