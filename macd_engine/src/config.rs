/// config.rs — Centralised configuration loaded from .env
///
/// Only the run surroundings are configurable (input file, column names,
/// starting capital, report location). The MACD windows are fixed constants
/// in `models`.
use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_PRICE_CSV:       &str = "data/prices.csv";
pub const DEFAULT_DATE_COLUMN:     &str = "Data";
pub const DEFAULT_OPEN_COLUMN:     &str = "Otwarcie";
pub const DEFAULT_STARTING_SHARES: f64  = 1000.0;
pub const DEFAULT_REPORT_DIR:      &str = "./reports";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // ── Input ────────────────────────────────────────────────────────
    pub price_csv:   PathBuf,
    pub date_column: String,
    pub open_column: String,

    // ── Simulation ───────────────────────────────────────────────────
    /// Shares held on the first day (initial state is INVESTED)
    pub starting_shares: f64,
    /// Evaluate indicator columns with rayon
    pub parallel: bool,

    // ── Output ───────────────────────────────────────────────────────
    pub report_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            price_csv:       DEFAULT_PRICE_CSV.into(),
            date_column:     DEFAULT_DATE_COLUMN.into(),
            open_column:     DEFAULT_OPEN_COLUMN.into(),
            starting_shares: DEFAULT_STARTING_SHARES,
            parallel:        false,
            report_dir:      DEFAULT_REPORT_DIR.into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables (after dotenv).
    pub fn from_env() -> Result<Self> {
        let cfg = Self::load_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Like `from_env` but without `validate()`, for callers that apply
    /// overrides first and validate the final values themselves.
    pub fn load_env() -> Result<Self> {
        dotenv::dotenv().ok(); // ignore missing .env

        let defaults = Self::default();
        let cfg = Self {
            price_csv: env::var("PRICE_CSV").map(PathBuf::from).unwrap_or(defaults.price_csv),
            date_column: env::var("DATE_COLUMN").unwrap_or(defaults.date_column),
            open_column: env::var("OPEN_COLUMN").unwrap_or(defaults.open_column),
            starting_shares: parse_env("STARTING_SHARES", defaults.starting_shares)?,
            parallel: parse_env("PARALLEL_INDICATORS", defaults.parallel)?,
            report_dir: env::var("REPORT_DIR").map(PathBuf::from).unwrap_or(defaults.report_dir),
        };
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.starting_shares.is_finite() || self.starting_shares <= 0.0 {
            bail!("starting_shares must be positive, got {}", self.starting_shares);
        }
        if self.date_column.is_empty() || self.open_column.is_empty() {
            bail!("date and open column names must not be empty");
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + Copy,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Config key {key}: {e}")),
        Err(_) => Ok(default),
    }
}
