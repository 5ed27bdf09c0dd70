/// lib.rs — MACD Backtest Library
///
/// Report export and trade-log rendering around `macd_engine`'s simulation.

pub mod reporting;

pub use reporting::*;
