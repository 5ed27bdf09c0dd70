use std::fs;
use std::path::PathBuf;

use macd_backtest::{BacktestSummary, ReportConfig, ReportWriter};
use macd_engine::data::load_price_csv;
use macd_engine::metrics::compute_metrics;
use macd_engine::{simulate, Action};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("macd_backtest_{}_{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// stooq-style export: descending dates, Polish column names.
fn write_price_csv(dir: &PathBuf) -> PathBuf {
    let start = chrono::NaiveDate::from_ymd_opt(2018, 2, 2).unwrap();
    let mut rows: Vec<String> = Vec::new();
    let mut price = 2500.0f64;
    for i in 0..80 {
        price *= if i < 40 { 1.02 } else { 0.97 };
        let date = start + chrono::Duration::days(i);
        rows.push(format!("{date},{price:.2},{:.2}", price * 1.01));
    }
    rows.reverse();
    let body = format!("Data,Otwarcie,Najwyzszy\n{}\n", rows.join("\n"));
    let path = dir.join("wig20_d.csv");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn csv_to_reports() {
    let dir = scratch_dir("csv_to_reports");
    let csv = write_price_csv(&dir);

    let series = load_price_csv(&csv, "Data", "Otwarcie").unwrap();
    assert_eq!(series.len(), 80);
    assert!(series.first().date < series.last().date);

    let result = simulate(&series, 1000.0).unwrap();
    assert!(result.trades().any(|d| d.applied == Action::Sell));

    let report = compute_metrics(&result);
    let summary = BacktestSummary::new("wig20_d.csv", &result, report).unwrap();
    let writer = ReportWriter::new(ReportConfig {
        output_dir: dir.join("reports"),
        ..ReportConfig::default()
    });
    let written = writer.export("run", &result, &summary).unwrap();
    assert_eq!(written.len(), 2);

    let days_csv = fs::read_to_string(&written[0]).unwrap();
    let mut lines = days_csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "date,open,macd,signal,intent,action,cash,shares,equity"
    );
    assert_eq!(lines.count(), 80);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&written[1]).unwrap()).unwrap();
    assert_eq!(json["metadata"]["source"], "wig20_d.csv");
    assert_eq!(
        json["trades"].as_array().unwrap().len(),
        result.trades().count()
    );
    assert_eq!(json["performance"]["n_days"], 80);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn export_can_be_disabled() {
    let dir = scratch_dir("export_disabled");
    let csv = write_price_csv(&dir);
    let series = load_price_csv(&csv, "Data", "Otwarcie").unwrap();
    let result = simulate(&series, 10.0).unwrap();
    let summary = BacktestSummary::new("x", &result, compute_metrics(&result)).unwrap();

    let writer = ReportWriter::new(ReportConfig {
        export_csv: false,
        export_json: false,
        output_dir: dir.join("reports"),
    });
    assert!(writer.export("run", &result, &summary).unwrap().is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unknown_column_is_an_error() {
    let dir = scratch_dir("unknown_column");
    let csv = write_price_csv(&dir);
    assert!(load_price_csv(&csv, "Date", "Open").is_err());
    let _ = fs::remove_dir_all(&dir);
}
