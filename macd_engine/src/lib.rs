/// lib.rs — MACD Indicator Engine
///
/// PriceSeries → EMA → MACD/SIGNAL → classifier → single-position simulator.
/// Everything below `models`, `strategy` and `backtest` is pure and I/O free;
/// `config` and `data` are the thin loading layer used by the CLI crate.

pub mod backtest;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod strategy;

pub use backtest::{simulate, DayRecord, Position, SimulationResult};
pub use error::{IndicatorError, SeriesError, SimulationError};
pub use models::*;
pub use strategy::classify;
