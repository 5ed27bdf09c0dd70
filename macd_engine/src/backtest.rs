/// backtest.rs — Single-Position Trading Simulation
///
/// Walks an annotated series in date order, classifying each day and
/// applying the result to a two-state position.
///
/// STATE MACHINE
/// ┌──────────────────────────────────────────────────────────┐
/// │                   BUY intent (price > 0)                 │
/// │        ┌───────────────────────────────────────┐         │
/// │        │                                       ▼         │
/// │   ┌─────────┐                           ┌────────────┐   │
/// │   │   OUT   │                           │  INVESTED  │   │
/// │   │  cash   │                           │  shares    │   │
/// │   └─────────┘                           └────────────┘   │
/// │        ▲                                       │         │
/// │        └───────────────────────────────────────┘         │
/// │                      SELL intent                         │
/// └──────────────────────────────────────────────────────────┘
///   initial state: INVESTED(starting_shares, cash 0)
///   any other (state, intent) pair is a no-op
///
/// FILLS
///   BUY : shares = ⌊cash / price⌋₀.₀₁ ; cash = ⌊cash − shares·price⌋₀.₀₁
///   SELL: cash   = ⌊cash + shares·price⌋₀.₀₁ ; shares = 0
///
/// PROFIT RATIO
///   (shares_T · open_T + cash_T) / (starting_shares · open_0)

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, info, warn};

use chrono::NaiveDate;

use crate::error::{SimResult, SimulationError};
use crate::models::{compute_indicators, Action, IndicatorPoint, PriceSeries};
use crate::strategy::classify;

/// Truncate to two decimal places, rounding toward zero.
///
/// Goes through `Decimal` so that values such as `0.29` (stored as
/// `0.28999…` in binary) keep their second decimal. Non-finite input yields 0.
pub fn floor_to_cent(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::ToZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0)
}

/// The simulator's allocation. Exactly one side carries the capital.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Position {
    /// Holding shares. `residual_cash` is the sub-share remainder of the last BUY.
    Invested { shares: f64, residual_cash: f64 },
    /// Holding cash only.
    Out { cash: f64 },
}

impl Position {
    pub fn new(starting_shares: f64) -> Self {
        Position::Invested { shares: starting_shares, residual_cash: 0.0 }
    }

    pub fn is_invested(&self) -> bool {
        matches!(self, Position::Invested { .. })
    }

    pub fn shares(&self) -> f64 {
        match *self {
            Position::Invested { shares, .. } => shares,
            Position::Out { .. } => 0.0,
        }
    }

    pub fn cash(&self) -> f64 {
        match *self {
            Position::Invested { residual_cash, .. } => residual_cash,
            Position::Out { cash } => cash,
        }
    }

    /// Mark-to-market value at `price`.
    pub fn value_at(&self, price: f64) -> f64 {
        self.shares() * price + self.cash()
    }

    /// OUT → INVESTED. `None` when already invested or the price cannot fill.
    pub fn buy(self, price: f64) -> Option<Position> {
        match self {
            Position::Out { cash } if price > 0.0 => {
                let shares = floor_to_cent(cash / price);
                let residual_cash = floor_to_cent(cash - shares * price).max(0.0);
                Some(Position::Invested { shares, residual_cash })
            }
            Position::Out { .. } => {
                warn!("BUY skipped: non-positive price {price}");
                None
            }
            Position::Invested { .. } => None,
        }
    }

    /// INVESTED → OUT. `None` when already out.
    pub fn sell(self, price: f64) -> Option<Position> {
        match self {
            Position::Invested { shares, residual_cash } => Some(Position::Out {
                cash: floor_to_cent(residual_cash + shares * price),
            }),
            Position::Out { .. } => None,
        }
    }

    /// Apply a classifier intent. Returns the new position and the action
    /// that actually took effect (`Hold` for no-ops).
    pub fn apply(self, intent: Action, price: f64) -> (Position, Action) {
        let next = match intent {
            Action::Buy => self.buy(price),
            Action::Sell => self.sell(price),
            Action::Hold => None,
        };
        match next {
            Some(p) => (p, intent),
            None => (self, Action::Hold),
        }
    }
}

/// One audited simulation day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub macd: f64,
    pub signal: f64,
    /// What the classifier asked for
    pub intent: Action,
    /// What the position actually did
    pub applied: Action,
    /// Position after the day
    pub cash: f64,
    pub shares: f64,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub days: Vec<DayRecord>,
    pub final_position: Position,
    pub starting_shares: f64,
    pub profit_ratio: f64,
}

impl SimulationResult {
    /// Days on which a BUY or SELL actually executed.
    pub fn trades(&self) -> impl Iterator<Item = &DayRecord> {
        self.days.iter().filter(|d| d.applied != Action::Hold)
    }

    pub fn intents(&self) -> Vec<Action> {
        self.days.iter().map(|d| d.intent).collect()
    }

    pub fn applied_actions(&self) -> Vec<Action> {
        self.days.iter().map(|d| d.applied).collect()
    }

    pub fn initial_equity(&self) -> f64 {
        self.days.first().map(|d| d.open * self.starting_shares).unwrap_or(0.0)
    }

    pub fn final_equity(&self) -> f64 {
        self.days.last().map(|d| d.equity).unwrap_or(0.0)
    }

    pub fn equity_curve(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.equity).collect()
    }
}

/// Compute indicators for `series` and run the simulation over them.
pub fn simulate(series: &PriceSeries, starting_shares: f64) -> SimResult<SimulationResult> {
    let points = compute_indicators(series)?;
    simulate_indicators(&points, starting_shares)
}

/// Run the simulation over an already annotated series.
pub fn simulate_indicators(
    points: &[IndicatorPoint],
    starting_shares: f64,
) -> SimResult<SimulationResult> {
    if !starting_shares.is_finite() || starting_shares <= 0.0 {
        return Err(SimulationError::InvalidStartingShares(starting_shares));
    }
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(SimulationError::EmptySeries),
    };
    let initial_value = starting_shares * first.open;
    if initial_value == 0.0 {
        return Err(SimulationError::ZeroInitialValue);
    }

    let mut position = Position::new(starting_shares);
    let mut days = Vec::with_capacity(points.len());

    for (i, point) in points.iter().enumerate() {
        let prev = i.checked_sub(1).map(|j| &points[j]);
        let intent = classify(prev, point);
        let (next, applied) = position.apply(intent, point.open);
        position = next;

        if applied != Action::Hold {
            debug!(
                "{} {:<4} @ {:.2}  macd={:.4} signal={:.4} → cash={:.2} shares={:.2}",
                point.date, applied, point.open, point.macd, point.signal,
                position.cash(), position.shares()
            );
        }

        days.push(DayRecord {
            date: point.date,
            open: point.open,
            macd: point.macd,
            signal: point.signal,
            intent,
            applied,
            cash: position.cash(),
            shares: position.shares(),
            equity: position.value_at(point.open),
        });
    }

    let profit_ratio = position.value_at(last.open) / initial_value;
    info!(
        "Simulation finished: {} days, {} trades, profit ratio {:.4}",
        days.len(),
        days.iter().filter(|d| d.applied != Action::Hold).count(),
        profit_ratio
    );

    Ok(SimulationResult {
        days,
        final_position: position,
        starting_shares,
        profit_ratio,
    })
}
