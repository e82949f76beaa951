//! Round-trip extraction — pairs each sell with the buy that opened it.

use serde::{Deserialize, Serialize};

use crate::domain::Trade;

/// One closed buy → sell cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTrip {
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_price: f64,
    pub exit_price: f64,
}

impl RoundTrip {
    pub fn profit(&self) -> f64 {
        self.exit_price - self.entry_price
    }

    /// (exit − entry) / entry.
    pub fn return_pct(&self) -> f64 {
        self.profit() / self.entry_price
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundTrips {
    pub trips: Vec<RoundTrip>,
}

impl RoundTrips {
    /// A sell counts only when the trade directly before it is a buy; a
    /// trailing open buy is ignored.
    pub fn from_trade_log(trades: &[Trade]) -> Self {
        let trips = trades
            .windows(2)
            .filter(|pair| pair[0].is_buy() && pair[1].is_sell())
            .map(|pair| RoundTrip {
                entry_index: pair[0].index,
                exit_index: pair[1].index,
                entry_price: pair[0].price,
                exit_price: pair[1].price,
            })
            .collect();
        Self { trips }
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn returns(&self) -> Vec<f64> {
        self.trips.iter().map(RoundTrip::return_pct).collect()
    }

    pub fn profits(&self) -> Vec<f64> {
        self.trips.iter().map(RoundTrip::profit).collect()
    }
}
