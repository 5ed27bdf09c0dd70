/// reporting.rs — Backtest report export
///
/// Turns a `SimulationResult` into:
/// - `<base>_days.csv`     one row per day (indicators, intent, applied action, position)
/// - `<base>_summary.json` run metadata, performance report and executed trades
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use macd_engine::metrics::PerfReport;
use macd_engine::{Action, SimulationResult};

/// Report generator configuration
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Export per-day records to CSV
    pub export_csv: bool,
    /// Export summary to JSON
    pub export_json: bool,
    /// Output directory
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            export_csv: true,
            export_json: true,
            output_dir: PathBuf::from("./reports"),
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// An executed BUY or SELL.
#[derive(Debug, Clone, Serialize)]
pub struct TradeInfo {
    pub date: NaiveDate,
    pub action: Action,
    pub price: f64,
    pub cash_after: f64,
    pub shares_after: f64,
}

/// JSON summary document
#[derive(Debug, Clone, Serialize)]
pub struct BacktestSummary {
    pub metadata: ReportMetadata,
    pub performance: PerfReport,
    pub trades: Vec<TradeInfo>,
}

impl BacktestSummary {
    /// `None` for an empty result (nothing to date the report with).
    pub fn new(source: &str, result: &SimulationResult, performance: PerfReport) -> Option<Self> {
        let (first, last) = (result.days.first()?, result.days.last()?);
        Some(Self {
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                source: source.to_owned(),
                start_date: first.date,
                end_date: last.date,
            },
            performance,
            trades: trade_list(result),
        })
    }
}

pub fn trade_list(result: &SimulationResult) -> Vec<TradeInfo> {
    result
        .trades()
        .map(|d| TradeInfo {
            date: d.date,
            action: d.applied,
            price: d.open,
            cash_after: d.cash,
            shares_after: d.shares,
        })
        .collect()
}

/// Per-day records as a data frame (dates rendered ISO-8601).
pub fn days_frame(result: &SimulationResult) -> Result<DataFrame> {
    let days = &result.days;
    let df = df!(
        "date" => days.iter().map(|d| d.date.to_string()).collect::<Vec<_>>(),
        "open" => days.iter().map(|d| d.open).collect::<Vec<_>>(),
        "macd" => days.iter().map(|d| d.macd).collect::<Vec<_>>(),
        "signal" => days.iter().map(|d| d.signal).collect::<Vec<_>>(),
        "intent" => days.iter().map(|d| d.intent.code() as i32).collect::<Vec<_>>(),
        "action" => days.iter().map(|d| d.applied.code() as i32).collect::<Vec<_>>(),
        "cash" => days.iter().map(|d| d.cash).collect::<Vec<_>>(),
        "shares" => days.iter().map(|d| d.shares).collect::<Vec<_>>(),
        "equity" => days.iter().map(|d| d.equity).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

pub struct ReportWriter {
    config: ReportConfig,
}

impl ReportWriter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Write the enabled outputs under `base_name`; returns the written paths.
    pub fn export(
        &self,
        base_name: &str,
        result: &SimulationResult,
        summary: &BacktestSummary,
    ) -> Result<Vec<PathBuf>> {
        let dir = &self.config.output_dir;
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let mut written = Vec::new();

        if self.config.export_csv {
            let path = dir.join(format!("{base_name}_days.csv"));
            write_days_csv(&path, result)?;
            info!("CSV day log exported to: {}", path.display());
            written.push(path);
        }

        if self.config.export_json {
            let path = dir.join(format!("{base_name}_summary.json"));
            let json = serde_json::to_string_pretty(summary)?;
            fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("JSON summary exported to: {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}

fn write_days_csv(path: &Path, result: &SimulationResult) -> Result<()> {
    let mut df = days_frame(result)?;
    let mut file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

/// Plain-text table of executed trades.
pub fn format_trade_log(result: &SimulationResult) -> String {
    let mut out = format!(
        "{:<6} {:<12} {:<5} {:>12} {:>14} {:>12}\n",
        "N", "DATE", "ACT", "PRICE", "CASH", "SHARES"
    );
    out.push_str(&"─".repeat(66));
    out.push('\n');
    for (i, t) in result.trades().enumerate() {
        out.push_str(&format!(
            "{:<6} {:<12} {:<5} {:>12.2} {:>14.2} {:>12.2}\n",
            i + 1,
            t.date,
            t.applied.label(),
            t.open,
            t.cash,
            t.shares
        ));
    }
    out
}
