use chrono::NaiveDate;
use macd_engine::backtest::simulate_indicators;
use macd_engine::strategy::classify_all;
use macd_engine::{compute_indicators, simulate, Action, Position, PriceSeries, WARM_UP};

fn series(opens: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2018, 2, 2).unwrap();
    PriceSeries::from_opens(start, opens).unwrap()
}

/// 40 days of 2% growth followed by 40 days of 3% decline.
fn rise_then_crash() -> Vec<f64> {
    let mut opens: Vec<f64> = (0..40).map(|i| 100.0 * 1.02f64.powi(i)).collect();
    let peak = opens[39];
    opens.extend((1..=40).map(|k| peak * 0.97f64.powi(k)));
    opens
}

fn assert_state_machine_respected(result: &macd_engine::SimulationResult, starting_shares: f64) {
    let mut invested = true;
    for day in &result.days {
        match day.applied {
            Action::Buy => {
                assert!(!invested, "BUY while invested on {}", day.date);
                invested = true;
            }
            Action::Sell => {
                assert!(invested, "SELL while out on {}", day.date);
                invested = false;
            }
            Action::Hold => {}
        }
        if invested {
            // Leftover cash from truncation is worth less than a hundredth
            // of a share plus a cent.
            assert!(day.cash >= 0.0 && day.cash < 0.01 * day.open + 0.01, "cash residue {}", day.cash);
            assert!(day.shares > 0.0 || starting_shares == 0.0);
        } else {
            assert_eq!(day.shares, 0.0);
        }
    }
    assert_eq!(result.final_position.is_invested(), invested);
}

#[test]
fn warm_up_rows_are_zero_for_any_series() {
    let pts = compute_indicators(&series(&rise_then_crash())).unwrap();
    for p in &pts[..26] {
        assert_eq!((p.macd, p.signal), (0.0, 0.0));
    }
    assert_eq!(WARM_UP, 27);
}

#[test]
fn strictly_rising_thirty_days() {
    let opens: Vec<f64> = (0..30).map(|i| 1.0 + i as f64 / 100.0).collect();
    let s = series(&opens);
    let pts = compute_indicators(&s).unwrap();

    for p in &pts[..=25] {
        assert_eq!(p.macd, 0.0);
        assert_eq!(p.signal, 0.0);
    }
    for p in &pts[WARM_UP..] {
        assert!(p.macd > 0.0, "macd on {} = {}", p.date, p.macd);
    }

    let result = simulate(&s, 1000.0).unwrap();
    assert_state_machine_respected(&result, 1000.0);
    // Rising prices only ever produce BUY intent, which is a no-op while invested.
    assert_eq!(result.trades().count(), 0);
    assert!(result.intents().iter().all(|a| *a != Action::Sell));
}

#[test]
fn crash_moves_to_cash_after_the_top() {
    let s = series(&rise_then_crash());
    let result = simulate(&s, 1000.0).unwrap();
    assert_state_machine_respected(&result, 1000.0);

    let trades: Vec<_> = result.trades().collect();
    assert!(!trades.is_empty());
    assert!(trades.len() <= 4, "too many trades: {}", trades.len());

    let first = trades[0];
    assert_eq!(first.applied, Action::Sell);
    let first_index = result.days.iter().position(|d| d.date == first.date).unwrap();
    assert!(first_index >= 40, "sold at index {first_index}, before the top");

    // Selling into the crash beats riding it all the way down.
    let buy_hold = s.last().open / s.first().open;
    assert!(result.profit_ratio > buy_hold);
}

#[test]
fn flat_price_keeps_profit_ratio_at_one() {
    let s = series(&[1.0; 60]);
    let result = simulate(&s, 1000.0).unwrap();
    assert_eq!(result.trades().count(), 0);
    assert_eq!(result.profit_ratio, 1.0);
    assert_eq!(result.final_position, Position::new(1000.0));
}

#[test]
fn indicators_are_idempotent() {
    let s = series(&rise_then_crash());
    let a = compute_indicators(&s).unwrap();
    let b = compute_indicators(&s).unwrap();
    assert_eq!(a, b);
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.macd.to_bits(), y.macd.to_bits());
        assert_eq!(x.signal.to_bits(), y.signal.to_bits());
    }
}

#[test]
fn standalone_classification_matches_simulator() {
    let s = series(&rise_then_crash());
    let pts = compute_indicators(&s).unwrap();
    let standalone = classify_all(&pts);

    let from_series = simulate(&s, 1000.0).unwrap();
    let from_points = simulate_indicators(&pts, 1000.0).unwrap();
    assert_eq!(standalone, from_series.intents());
    assert_eq!(from_series, from_points);
}

#[test]
fn applied_actions_are_subset_of_intents() {
    let s = series(&rise_then_crash());
    let result = simulate(&s, 250.0).unwrap();
    for day in &result.days {
        assert!(day.applied == Action::Hold || day.applied == day.intent);
    }
    let last = result.days.last().unwrap();
    let expected = (result.final_position.value_at(last.open)) / (250.0 * s.first().open);
    assert_eq!(result.profit_ratio, expected);
}
