/// models/macd.rs — MACD / SIGNAL derivation
///
///   MACD(t)   = EMA_12(price)(t) − EMA_26(price)(t)
///   SIGNAL(t) = EMA_9(MACD)(t)
///
/// SIGNAL reads the MACD column, so the whole MACD column is built first and
/// SIGNAL is evaluated over it afterwards. The output is a fresh sequence;
/// the input series is never mutated.

use rayon::prelude::*;

use crate::error::IndicatorResult;
use crate::models::{
    ema_at, IndicatorPoint, PriceSeries, FAST_WINDOW, SIGNAL_WINDOW, SLOW_WINDOW,
};

/// Annotate every date of `series` with its MACD and SIGNAL readings.
pub fn compute_indicators(series: &PriceSeries) -> IndicatorResult<Vec<IndicatorPoint>> {
    let opens = series.opens();

    let macd = (0..opens.len())
        .map(|t| macd_at(&opens, t))
        .collect::<IndicatorResult<Vec<f64>>>()?;
    let signal = (0..macd.len())
        .map(|t| ema_at(&macd, t, SIGNAL_WINDOW))
        .collect::<IndicatorResult<Vec<f64>>>()?;

    Ok(annotate(series, &macd, &signal))
}

/// Same result as [`compute_indicators`], with each column evaluated in parallel.
///
/// Every per-date EMA is a pure function of earlier rows, so the order of
/// evaluation inside a column does not affect the output.
pub fn compute_indicators_par(series: &PriceSeries) -> IndicatorResult<Vec<IndicatorPoint>> {
    let opens = series.opens();

    let macd = (0..opens.len())
        .into_par_iter()
        .map(|t| macd_at(&opens, t))
        .collect::<IndicatorResult<Vec<f64>>>()?;
    let signal = (0..macd.len())
        .into_par_iter()
        .map(|t| ema_at(&macd, t, SIGNAL_WINDOW))
        .collect::<IndicatorResult<Vec<f64>>>()?;

    Ok(annotate(series, &macd, &signal))
}

fn macd_at(opens: &[f64], t: usize) -> IndicatorResult<f64> {
    Ok(ema_at(opens, t, FAST_WINDOW)? - ema_at(opens, t, SLOW_WINDOW)?)
}

fn annotate(series: &PriceSeries, macd: &[f64], signal: &[f64]) -> Vec<IndicatorPoint> {
    series
        .points()
        .iter()
        .zip(macd.iter().zip(signal.iter()))
        .map(|(p, (&macd, &signal))| IndicatorPoint {
            date: p.date,
            open: p.open,
            macd,
            signal,
        })
        .collect()
}
