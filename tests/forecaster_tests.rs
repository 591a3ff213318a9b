use chrono::NaiveDate;
use lagcast::error::ForecastError;
use lagcast::features::make_supervised;
use lagcast::forecaster::{
    forecast_recursive, next_business_days, ForecastModel, Predictor, StandardScaler,
};

struct WindowMean {
    lags: usize,
}

impl Predictor for WindowMean {
    fn lags(&self) -> usize {
        self.lags
    }

    fn predict(&self, window: &[f64]) -> f64 {
        window.iter().sum::<f64>() / window.len() as f64
    }
}

#[test]
fn mean_model_has_fixed_point() {
    let path = forecast_recursive(&[10.0, 10.0], &WindowMean { lags: 2 }, 3);
    assert_eq!(path, vec![10.0, 10.0, 10.0]);
}

#[test]
fn recursion_feeds_predictions_back_as_newest_lag() {
    // window [4, 2] -> 3, then [3, 4] -> 3.5, then [3.5, 3] -> 3.25
    let path = forecast_recursive(&[4.0, 2.0], &WindowMean { lags: 2 }, 3);
    assert_eq!(path, vec![3.0, 3.5, 3.25]);
}

#[test]
#[should_panic(expected = "seed window length must equal the fitted lag depth")]
fn recursion_rejects_wrong_window_length() {
    let _ = forecast_recursive(&[1.0, 2.0, 3.0], &WindowMean { lags: 2 }, 1);
}

#[test]
fn fit_refuses_empty_matrix() {
    let m = make_supervised(&[1.0, 2.0], 3);
    let err = ForecastModel::fit(&m).unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientHistory { .. }));
}

#[test]
fn fit_recovers_exact_linear_recurrence() {
    // x_t = 2 + 0.5 * x_{t-1}
    let mut series = vec![100.0];
    for _ in 0..30 {
        let prev = *series.last().unwrap();
        series.push(2.0 + 0.5 * prev);
    }
    let model = ForecastModel::fit(&make_supervised(&series, 1)).unwrap();
    for x in [10.0, 40.0, 80.0] {
        let y = model.predict(&[x]);
        assert!((y - (2.0 + 0.5 * x)).abs() < 1e-6, "x={} y={}", x, y);
    }
}

#[test]
fn collinear_trend_lags_extrapolate_linearly() {
    let series: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let model = ForecastModel::fit(&make_supervised(&series, 5)).unwrap();
    let seed = [129.0, 128.0, 127.0, 126.0, 125.0];
    let path = forecast_recursive(&seed, &model, 5);
    for (i, v) in path.iter().enumerate() {
        let expected = 130.0 + i as f64;
        assert!((v - expected).abs() < 1e-4, "step {} got {}", i, v);
    }
}

#[test]
#[should_panic(expected = "feature window length must equal the fitted lag depth")]
fn model_predict_rejects_wrong_window_length() {
    let series: Vec<f64> = (0..20).map(|i| 10.0 + (i % 3) as f64).collect();
    let model = ForecastModel::fit(&make_supervised(&series, 3)).unwrap();
    let _ = model.predict(&[1.0, 2.0]);
}

#[test]
fn scaler_uses_population_stats_and_guards_constant_columns() {
    let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
    let s = StandardScaler::fit(&rows, 2);
    assert_eq!(s.mean(), &[2.0, 5.0]);
    assert!((s.scale()[0] - 1.0).abs() < 1e-12);
    assert!((s.scale()[1] - 1.0).abs() < 1e-12);
    assert_eq!(s.transform(&[3.0, 5.0]), vec![1.0, 0.0]);
}

#[test]
fn business_days_skip_weekends() {
    let friday = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
    let days = next_business_days(friday, 3).unwrap();
    assert_eq!(
        days,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        ]
    );

    let saturday = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
    assert_eq!(
        next_business_days(saturday, 1).unwrap(),
        vec![NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()]
    );
    assert!(next_business_days(friday, 0).unwrap().is_empty());
}

#[test]
fn business_days_stop_at_end_of_calendar() {
    assert_eq!(next_business_days(NaiveDate::MAX, 5), None);
    assert_eq!(next_business_days(NaiveDate::MAX, 0), Some(Vec::new()));
    let near_end = NaiveDate::MAX.pred_opt().unwrap().pred_opt().unwrap();
    assert!(next_business_days(near_end, 400).is_none());
}
