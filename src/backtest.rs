use std::ops::Range;

use crate::features::make_supervised;
use crate::forecaster::ForecastModel;

pub const DEFAULT_SPLITS: usize = 5;
const MIN_BACKTEST_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkForwardFold {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

/// Expanding-window folds over `n_rows` ordered samples. Test blocks have
/// `n_rows / (splits + 1)` rows and tile the tail of the series; each fold
/// trains on every row before its test block. Returns no folds when the
/// series cannot fill `splits + 1` blocks.
pub fn walk_forward_splits(n_rows: usize, splits: usize) -> Vec<WalkForwardFold> {
    if splits == 0 {
        return Vec::new();
    }
    let Some(blocks) = splits.checked_add(1) else {
        return Vec::new();
    };
    let test_size = n_rows / blocks;
    if test_size == 0 {
        return Vec::new();
    }
    let first_test = n_rows - splits * test_size;
    (0..splits)
        .map(|i| {
            let start = first_test + i * test_size;
            WalkForwardFold {
                train: 0..start,
                test: start..start + test_size,
            }
        })
        .collect()
}

/// Population standard deviation; `None` for an empty slice.
fn std_dev(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    Some(var.max(0.0).sqrt())
}

fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let sse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, y_hat)| (y - y_hat) * (y - y_hat))
        .sum();
    (sse / actual.len() as f64).sqrt()
}

/// Expected one-step RMSE of the lag forecaster, estimated by walk-forward
/// cross-validation. Short histories fall back to the volatility of first
/// differences of the target series.
pub fn backtest_rmse(closes: &[f64], lags: usize, splits: usize) -> f64 {
    let matrix = make_supervised(closes, lags);
    if matrix.len() < MIN_BACKTEST_ROWS.max(splits.saturating_add(5)) {
        let diffs: Vec<f64> = matrix.targets().windows(2).map(|w| w[1] - w[0]).collect();
        let fallback = std_dev(&diffs).filter(|v| v.is_finite()).unwrap_or(0.0);
        tracing::debug!(
            rows = matrix.len(),
            fallback,
            "History too short for walk-forward folds; using diff volatility"
        );
        return fallback;
    }

    let folds = walk_forward_splits(matrix.len(), splits);
    let mut scores = Vec::with_capacity(folds.len());
    for (i, fold) in folds.iter().enumerate() {
        let train = matrix.slice(fold.train.clone());
        let test = matrix.slice(fold.test.clone());
        let model = match ForecastModel::fit(&train) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(fold = i, error = %e, "Skipping fold");
                continue;
            }
        };
        let score = rmse(test.targets(), &model.predict_matrix(&test));
        tracing::debug!(
            fold = i,
            train_rows = train.len(),
            test_rows = test.len(),
            rmse = score,
            "Walk-forward fold"
        );
        scores.push(score);
    }
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}
