/// metrics.rs — Performance Metrics
///
/// ─────────────────────────────────────────────────────────────────────────
/// DEFINITIONS
/// ─────────────────────────────────────────────────────────────────────────
///
/// PROFIT RATIO
///   PR = (shares_T · open_T + cash_T) / (starting_shares · open_0)
///   Total return = PR − 1.  No annualisation, no fees.
///
/// BUY & HOLD RATIO
///   BH = open_T / open_0   (what the starting shares would be worth untouched)
///   Excess = PR − BH
///
/// MAXIMUM DRAWDOWN (daily mark-to-market equity E_t)
///   peak_t = max_{s ≤ t}(E_s)
///   DD_t   = (E_t − peak_t) / peak_t
///   MaxDD  = min_t(DD_t)   (most negative)
/// ─────────────────────────────────────────────────────────────────────────

use serde::Serialize;

use crate::backtest::SimulationResult;
use crate::models::Action;

/// Summary of one simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct PerfReport {
    pub n_days:           usize,
    pub n_trades:         usize,
    pub n_buys:           usize,
    pub n_sells:          usize,
    pub profit_ratio:     f64,
    pub total_return:     f64,  // fraction
    pub buy_hold_ratio:   f64,
    pub excess_ratio:     f64,
    pub max_drawdown:     f64,  // fraction (negative)
    pub starting_shares:  f64,
    pub final_shares:     f64,
    pub final_cash:       f64,
    pub initial_equity:   f64,
    pub final_equity:     f64,
}

impl std::fmt::Display for PerfReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "════════════════════════════════════════════")?;
        writeln!(f, "  MACD SIMULATION — PERFORMANCE REPORT")?;
        writeln!(f, "════════════════════════════════════════════")?;
        writeln!(f, "  Days           : {}", self.n_days)?;
        writeln!(f, "  Trades         : {} ({} buy / {} sell)", self.n_trades, self.n_buys, self.n_sells)?;
        writeln!(f, "  Profit Ratio   : {:.4}", self.profit_ratio)?;
        writeln!(f, "  Total Return   : {:.2}%", self.total_return * 100.0)?;
        writeln!(f, "  Buy & Hold     : {:.4}", self.buy_hold_ratio)?;
        writeln!(f, "  Excess vs B&H  : {:+.4}", self.excess_ratio)?;
        writeln!(f, "  Max Drawdown   : {:.2}%", self.max_drawdown * 100.0)?;
        writeln!(f, "  Shares         : {:.2} → {:.2}", self.starting_shares, self.final_shares)?;
        writeln!(f, "  Cash           : {:.2}", self.final_cash)?;
        writeln!(f, "  Initial Equity : {:.2}", self.initial_equity)?;
        writeln!(f, "  Final Equity   : {:.2}", self.final_equity)?;
        writeln!(f, "════════════════════════════════════════════")
    }
}

/// Compute the report for a finished simulation.
pub fn compute_metrics(result: &SimulationResult) -> PerfReport {
    let n_buys = result.days.iter().filter(|d| d.applied == Action::Buy).count();
    let n_sells = result.days.iter().filter(|d| d.applied == Action::Sell).count();

    let buy_hold_ratio = match (result.days.first(), result.days.last()) {
        (Some(first), Some(last)) if first.open > 0.0 => last.open / first.open,
        _ => 0.0,
    };

    PerfReport {
        n_days: result.days.len(),
        n_trades: n_buys + n_sells,
        n_buys,
        n_sells,
        profit_ratio: result.profit_ratio,
        total_return: result.profit_ratio - 1.0,
        buy_hold_ratio,
        excess_ratio: result.profit_ratio - buy_hold_ratio,
        max_drawdown: max_drawdown(&result.equity_curve()),
        starting_shares: result.starting_shares,
        final_shares: result.final_position.shares(),
        final_cash: result.final_position.cash(),
        initial_equity: result.initial_equity(),
        final_equity: result.final_equity(),
    }
}

/// Maximum drawdown from an equity curve.
/// Returns a non-positive value (e.g. −0.15 = −15% drawdown).
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0f64;

    for &e in equity_curve {
        if e > peak {
            peak = e;
        }
        if peak <= 0.0 {
            continue;
        }
        let dd = (e - peak) / peak;
        if dd < max_dd {
            max_dd = dd;
        }
    }
    max_dd
}
