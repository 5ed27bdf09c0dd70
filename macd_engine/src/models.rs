pub mod ema;
pub mod macd;

pub use ema::{ema, ema_at, EmaSource};
pub use macd::{compute_indicators, compute_indicators_par};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{SeriesError, SeriesResult};

/// Short EMA window of the MACD line.
pub const FAST_WINDOW: usize = 12;
/// Long EMA window of the MACD line; the longest window used anywhere.
pub const SLOW_WINDOW: usize = 26;
/// EMA window of the SIGNAL line (applied to MACD values).
pub const SIGNAL_WINDOW: usize = 9;
/// Observations that must precede a date before any EMA is evaluated there.
pub const WARM_UP: usize = SLOW_WINDOW + 1;

/// One trading day: date and opening price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, open: f64) -> Self {
        Self { date, open }
    }
}

/// Validated daily price series: non-empty, strictly ascending unique dates,
/// finite non-negative opens. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> SeriesResult<Self> {
        if points.is_empty() {
            return Err(SeriesError::Empty);
        }
        for p in &points {
            if !p.open.is_finite() {
                return Err(SeriesError::NonFinitePrice { date: p.date });
            }
            if p.open < 0.0 {
                return Err(SeriesError::NegativePrice { date: p.date, price: p.open });
            }
        }
        for pair in points.windows(2) {
            let (previous, next) = (pair[0].date, pair[1].date);
            if next == previous {
                return Err(SeriesError::DuplicateDate(next));
            }
            if next < previous {
                return Err(SeriesError::Unordered { previous, next });
            }
        }
        Ok(Self { points })
    }

    /// Builds a series from consecutive calendar days starting at `start`.
    pub fn from_opens(start: NaiveDate, opens: &[f64]) -> SeriesResult<Self> {
        let points = start
            .iter_days()
            .zip(opens.iter())
            .map(|(date, &open)| PricePoint::new(date, open))
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a validated series; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.open).collect()
    }

    pub fn first(&self) -> &PricePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }

    /// Position of `date` in the series (dates are sorted, so binary search).
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.points.binary_search_by_key(&date, |p| p.date).ok()
    }
}

/// A price point annotated with its MACD and SIGNAL readings.
/// Both are exactly 0 inside the warm-up region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub open: f64,
    pub macd: f64,
    pub signal: f64,
}

impl IndicatorPoint {
    /// True while either line is still at its "not yet meaningful" sentinel.
    pub fn in_warm_up(&self) -> bool {
        self.macd == 0.0 || self.signal == 0.0
    }
}

/// Trade action for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Hold,
    Buy,
    Sell,
}

impl Action {
    /// Numeric trade-log code: BUY = 1, SELL = -1, HOLD = 0.
    pub fn code(self) -> i8 {
        match self {
            Action::Buy => 1,
            Action::Sell => -1,
            Action::Hold => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 3, d).unwrap()
    }

    #[test]
    fn rejects_empty_series() {
        assert_eq!(PriceSeries::new(vec![]), Err(SeriesError::Empty));
    }

    #[test]
    fn rejects_duplicate_and_unordered_dates() {
        let dup = vec![PricePoint::new(day(1), 1.0), PricePoint::new(day(1), 2.0)];
        assert_eq!(PriceSeries::new(dup), Err(SeriesError::DuplicateDate(day(1))));

        let back = vec![PricePoint::new(day(2), 1.0), PricePoint::new(day(1), 2.0)];
        assert_eq!(
            PriceSeries::new(back),
            Err(SeriesError::Unordered { previous: day(2), next: day(1) })
        );
    }

    #[test]
    fn rejects_negative_and_nan_prices() {
        let neg = vec![PricePoint::new(day(1), -0.5)];
        assert!(matches!(PriceSeries::new(neg), Err(SeriesError::NegativePrice { .. })));

        let nan = vec![PricePoint::new(day(1), f64::NAN)];
        assert_eq!(PriceSeries::new(nan), Err(SeriesError::NonFinitePrice { date: day(1) }));
    }

    #[test]
    fn index_lookup() {
        let s = PriceSeries::from_opens(day(1), &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(s.index_of(day(3)), Some(2));
        assert_eq!(s.index_of(day(9)), None);
        assert_eq!(s.last().open, 3.0);
    }

    #[test]
    fn action_codes() {
        assert_eq!(Action::Buy.code(), 1);
        assert_eq!(Action::Sell.code(), -1);
        assert_eq!(Action::Hold.code(), 0);
    }
}
