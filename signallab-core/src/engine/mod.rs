//! Backtesting engine — replays strategy transitions into trades.
//!
//! The engine is a two-state machine (FLAT/LONG) over a single instrument.
//! One unit is bought or sold at the close of a transition bar; there are no
//! partial fills, costs, or order types.

pub mod account;
pub mod simulator;

pub use account::{Account, OpenPosition, PositionState};
pub use simulator::{SimulationResult, Simulator};
