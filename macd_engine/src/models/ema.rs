/// models/ema.rs — Windowed Exponential Moving Average
///
/// ─────────────────────────────────────────────────────────────────────────
/// DEFINITION
/// ─────────────────────────────────────────────────────────────────────────
///
/// For a target index t and window length N:
///
///   α   = 2 / (N + 1)
///   x_i = value at index t − 1 − i,   i = 0..N   (N + 1 observations,
///                                                  most recent first,
///                                                  target itself excluded)
///   w_i = (1 − α)^i
///
///   EMA_N(t) = Σ x_i·w_i / Σ w_i
///
/// Every call is recomputed from its own fixed window; there is no recursive
/// state seeded from older history.
///
/// WARM-UP
///   t < WARM_UP (= SLOW_WINDOW + 1)  →  0.0  ("not yet meaningful")
///   The constant is shared by every window length.
///
/// LONG WINDOWS
///   A window reaching past row 0 is clipped there. Past warm-up at least
///   one row always remains and w_0 = 1, so Σ w_i ≥ 1.
///
/// DEGENERATE WINDOW
///   Σ w_i = 0 (empty window)  →  0.0. Kept as a guard; clipping means the
///   fixed windows never reach it.
/// ─────────────────────────────────────────────────────────────────────────

use chrono::NaiveDate;

use crate::error::{IndicatorError, IndicatorResult};
use crate::models::{IndicatorPoint, PriceSeries, WARM_UP};

/// Which column of an annotated series an EMA is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmaSource {
    /// Raw opening price
    Price,
    /// Already-computed MACD line (used for SIGNAL)
    Macd,
}

impl EmaSource {
    fn pick(self, point: &IndicatorPoint) -> f64 {
        match self {
            EmaSource::Price => point.open,
            EmaSource::Macd => point.macd,
        }
    }
}

/// EMA over a plain column of values at position `index`.
pub fn ema_at(values: &[f64], index: usize, window: usize) -> IndicatorResult<f64> {
    windowed(values.len(), index, window, |i| values[i])
}

/// EMA at `as_of` over the selected column of an annotated series.
///
/// # Errors
/// `InvalidDate` if `as_of` is absent, `InvalidParameter` if `window == 0`.
pub fn ema(
    points: &[IndicatorPoint],
    as_of: NaiveDate,
    window: usize,
    source: EmaSource,
) -> IndicatorResult<f64> {
    let index = points
        .binary_search_by_key(&as_of, |p| p.date)
        .map_err(|_| IndicatorError::InvalidDate(as_of))?;
    windowed(points.len(), index, window, |i| source.pick(&points[i]))
}

impl PriceSeries {
    /// EMA of the opening price at `as_of`.
    pub fn ema(&self, as_of: NaiveDate, window: usize) -> IndicatorResult<f64> {
        let index = self
            .index_of(as_of)
            .ok_or(IndicatorError::InvalidDate(as_of))?;
        let points = self.points();
        windowed(points.len(), index, window, |i| points[i].open)
    }
}

fn windowed<F>(len: usize, index: usize, window: usize, value_at: F) -> IndicatorResult<f64>
where
    F: Fn(usize) -> f64,
{
    if window == 0 {
        return Err(IndicatorError::InvalidParameter {
            name: "window",
            reason: "window length must be positive".into(),
        });
    }
    if index >= len {
        return Err(IndicatorError::IndexOutOfRange { index, len });
    }
    if index < WARM_UP {
        return Ok(0.0);
    }

    let alpha = 2.0 / (window as f64 + 1.0);
    let decay = 1.0 - alpha;
    // Windows longer than the available history are clipped at the first row.
    let start = index.saturating_sub(window.saturating_add(1));

    let mut top = 0.0;
    let mut bot = 0.0;
    for (i, idx) in (start..index).rev().enumerate() {
        let w = decay.powi(i as i32);
        top += value_at(idx) * w;
        bot += w;
    }

    if bot == 0.0 {
        return Ok(0.0);
    }
    Ok(top / bot)
}
