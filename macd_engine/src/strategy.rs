/// strategy.rs — MACD / SIGNAL trade classifier
///
/// DECISION RULE (level-based, evaluated every day)
///   no previous reading            → HOLD
///   MACD == 0 or SIGNAL == 0       → HOLD   (warm-up)
///   SIGNAL >  MACD                 → SELL
///   otherwise                      → BUY
///
/// The rule fires on every day the inequality holds, not only on the day the
/// lines cross. Whether the intent turns into a trade is decided by the
/// simulator's position state.

use crate::models::{Action, IndicatorPoint};

/// Classify `current` given the immediately preceding reading, if any.
pub fn classify(prev: Option<&IndicatorPoint>, current: &IndicatorPoint) -> Action {
    if prev.is_none() || current.in_warm_up() {
        return Action::Hold;
    }
    if current.signal > current.macd {
        Action::Sell
    } else {
        Action::Buy
    }
}

/// Classify a whole indicator sequence in date order.
pub fn classify_all(points: &[IndicatorPoint]) -> Vec<Action> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| classify(i.checked_sub(1).map(|j| &points[j]), p))
        .collect()
}
