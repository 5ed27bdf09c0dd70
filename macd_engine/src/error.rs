//! Error types for the indicator engine and the trading simulator.

use chrono::NaiveDate;
use thiserror::Error;

/// Failures of a single EMA / indicator evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("Invalid date: {0} is not part of the series")]
    InvalidDate(NaiveDate),

    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Index {index} out of range for series of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Violations of the price series invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("Price series is empty")]
    Empty,

    #[error("Dates out of order: {next} follows {previous}")]
    Unordered { previous: NaiveDate, next: NaiveDate },

    #[error("Duplicate date: {0}")]
    DuplicateDate(NaiveDate),

    #[error("Negative open price {price} on {date}")]
    NegativePrice { date: NaiveDate, price: f64 },

    #[error("Non-finite open price on {date}")]
    NonFinitePrice { date: NaiveDate },
}

/// Failures of a simulation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Cannot simulate over an empty series")]
    EmptySeries,

    #[error("Starting shares must be positive and finite, got {0}")]
    InvalidStartingShares(f64),

    #[error("Initial portfolio value is zero; profit ratio is undefined")]
    ZeroInitialValue,

    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

pub type IndicatorResult<T> = std::result::Result<T, IndicatorError>;
pub type SeriesResult<T> = std::result::Result<T, SeriesError>;
pub type SimResult<T> = std::result::Result<T, SimulationError>;
