/// main.rs — MACD Backtest Entry Point
///
/// Usage:
///   cargo run --bin macd_backtest -- run --csv wig20_d.csv
///   cargo run --bin macd_backtest -- indicators --csv wig20_d.csv --tail 20
///
/// Flags override values from the environment / .env (see `AppConfig`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use macd_backtest::{format_trade_log, BacktestSummary, ReportConfig, ReportWriter};
use macd_engine::backtest::simulate_indicators;
use macd_engine::config::AppConfig;
use macd_engine::data::load_price_csv;
use macd_engine::metrics::compute_metrics;
use macd_engine::strategy::classify_all;
use macd_engine::{compute_indicators, compute_indicators_par, IndicatorPoint, PriceSeries};

#[derive(Parser)]
#[command(name = "macd_backtest")]
#[command(about = "MACD indicator backtest over a daily price series")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate MACD-driven trading and report the profit ratio
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Shares held on the first day
        #[arg(short, long)]
        shares: Option<f64>,

        /// Output directory for reports
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Skip writing CSV / JSON reports
        #[arg(long)]
        no_export: bool,
    },

    /// Print the most recent MACD / SIGNAL readings
    Indicators {
        #[command(flatten)]
        input: InputArgs,

        /// Number of trailing rows to print
        #[arg(short, long, default_value = "20")]
        tail: usize,
    },
}

#[derive(Args)]
pub struct InputArgs {
    /// Price CSV path
    #[arg(short, long)]
    csv: Option<PathBuf>,

    /// Name of the date column
    #[arg(long)]
    date_column: Option<String>,

    /// Name of the opening price column
    #[arg(long)]
    open_column: Option<String>,

    /// Evaluate indicator columns in parallel
    #[arg(long)]
    parallel: bool,

    /// Enable debug logging (every executed trade)
    #[arg(short, long)]
    verbose: bool,
}

impl InputArgs {
    fn apply(&self, cfg: &mut AppConfig) {
        if let Some(csv) = &self.csv {
            cfg.price_csv = csv.clone();
        }
        if let Some(c) = &self.date_column {
            cfg.date_column = c.clone();
        }
        if let Some(c) = &self.open_column {
            cfg.open_column = c.clone();
        }
        cfg.parallel |= self.parallel;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Run { input, .. } | Commands::Indicators { input, .. } => input.verbose,
    };
    init_logging(verbose);

    let mut cfg = AppConfig::load_env()?;

    match cli.command {
        Commands::Run { input, shares, output_dir, no_export } => {
            input.apply(&mut cfg);
            if let Some(s) = shares {
                cfg.starting_shares = s;
            }
            if let Some(dir) = output_dir {
                cfg.report_dir = dir;
            }
            cfg.validate()?;
            run(&cfg, !no_export)
        }
        Commands::Indicators { input, tail } => {
            input.apply(&mut cfg);
            cfg.validate()?;
            indicators(&cfg, tail)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn load(cfg: &AppConfig) -> Result<(PriceSeries, Vec<IndicatorPoint>)> {
    info!(
        "Config: csv={} date_column={} open_column={} parallel={}",
        cfg.price_csv.display(), cfg.date_column, cfg.open_column, cfg.parallel
    );
    let series = load_price_csv(&cfg.price_csv, &cfg.date_column, &cfg.open_column)?;
    info!(
        "Loaded {} days ({} → {})",
        series.len(), series.first().date, series.last().date
    );

    let points = if cfg.parallel {
        compute_indicators_par(&series)?
    } else {
        compute_indicators(&series)?
    };
    Ok((series, points))
}

fn run(cfg: &AppConfig, export: bool) -> Result<()> {
    let (_series, points) = load(cfg)?;
    let result = simulate_indicators(&points, cfg.starting_shares)?;
    let report = compute_metrics(&result);

    println!("\n{}", report);
    println!(
        "Capital after MACD trading: {:.2} shares, {:.2} cash, profit = {:.4} ({:+.2} %)",
        result.final_position.shares(),
        result.final_position.cash(),
        result.profit_ratio,
        result.profit_ratio * 100.0 - 100.0
    );
    println!("\n{}", format_trade_log(&result));

    if export {
        let source = cfg.price_csv.display().to_string();
        let summary = BacktestSummary::new(&source, &result, report)
            .context("empty simulation result")?;
        let writer = ReportWriter::new(ReportConfig {
            output_dir: cfg.report_dir.clone(),
            ..ReportConfig::default()
        });
        let base_name = format!("macd_{}", Utc::now().format("%Y%m%d_%H%M%S"));
        writer.export(&base_name, &result, &summary)?;
    }

    Ok(())
}

fn indicators(cfg: &AppConfig, tail: usize) -> Result<()> {
    let (_series, points) = load(cfg)?;
    let intents = classify_all(&points);
    let skip = points.len().saturating_sub(tail);

    println!(
        "\n{:<12} {:>12} {:>12} {:>12} {:<5}",
        "DATE", "OPEN", "MACD", "SIGNAL", "INTENT"
    );
    println!("{}", "─".repeat(58));
    for (p, a) in points.iter().zip(&intents).skip(skip) {
        println!(
            "{:<12} {:>12.2} {:>12.4} {:>12.4} {:<5}",
            p.date, p.open, p.macd, p.signal, a.label()
        );
    }
    Ok(())
}
