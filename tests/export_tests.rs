use chrono::NaiveDate;
use lagcast::decision::evaluate_decision;
use lagcast::export::{
    decision_json, render_decision_report, render_forecast_head, write_decision_json,
    write_forecast_csv,
};
use lagcast::model::{ForecastPath, ForecastReport};

fn report(path: Vec<f64>, rmse: f64) -> ForecastReport {
    let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let dates = (0..path.len())
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect();
    let path = ForecastPath::new(path, dates);
    let decision = evaluate_decision(100.0, path.values(), rmse, path.horizon());
    ForecastReport {
        ticker: "AAPL".to_string(),
        last_close: 100.0,
        pred_last: path.last().unwrap(),
        horizon: path.horizon(),
        lags: 3,
        forecast: path.points("AAPL"),
        decision,
    }
}

fn temp_path(ext: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("lagcast-{}.{}", uuid::Uuid::new_v4(), ext))
}

#[test]
fn forecast_csv_has_one_row_per_step() {
    let path = temp_path("csv");
    write_forecast_csv(&path, &report(vec![101.0, 102.0, 103.5], 1.0)).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "date,ticker,pred_close");
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "2024-03-04,AAPL,101.0");
    assert!(lines[3].starts_with("2024-03-06,AAPL,103.5"));
}

#[test]
fn decision_json_is_flat() {
    let json = decision_json(&report(vec![101.0, 104.0], 1.0)).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    for key in [
        "ticker",
        "last_close",
        "pred_last",
        "pred_return_h",
        "uncert_h",
        "signal_to_noise",
        "slope_pred",
        "max_drawdown_pred",
        "buy",
        "suggested_position_0to1",
        "stop_loss_rel",
        "take_profit_rel",
    ] {
        assert!(v.get(key).is_some(), "missing key {}", key);
    }
    assert_eq!(v["ticker"], "AAPL");
    assert_eq!(v["pred_last"], 104.0);
    assert!(v.get("decision").is_none());
}

#[test]
fn infinite_signal_to_noise_serializes_as_null() {
    let json = decision_json(&report(vec![101.0, 104.0], 0.0)).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(v["signal_to_noise"].is_null());
    assert_eq!(v["suggested_position_0to1"], 0.0);
}

#[test]
fn decision_json_file_round_trips_through_disk() {
    let path = temp_path("json");
    let r = report(vec![99.0, 98.0], 2.0);
    write_decision_json(&path, &r).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(text, decision_json(&r).unwrap());
}

#[test]
fn text_renderings_include_headline_values() {
    let r = report(vec![101.0, 102.0, 103.0], 1.0);
    let head = render_forecast_head(&r, 2);
    assert_eq!(head.lines().count(), 3);
    assert!(head.contains("pred_close"));
    assert!(head.contains("2024-03-05"));
    assert!(!head.contains("2024-03-06"));

    let text = render_decision_report(&r);
    assert!(text.starts_with("=== DECISION REPORT ==="));
    assert!(text.contains("ticker: AAPL"));
    assert!(text.contains("buy: "));
    assert_eq!(text.lines().count(), 13);
}
