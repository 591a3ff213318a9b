use lagcast::backtest::{backtest_rmse, walk_forward_splits, DEFAULT_SPLITS};

#[test]
fn short_history_falls_back_to_diff_volatility() {
    // diffs [1, -2] -> population std 1.5
    let v = backtest_rmse(&[100.0, 101.0, 99.0], 0, DEFAULT_SPLITS);
    assert!((v - 1.5).abs() < 1e-12, "got {}", v);
}

#[test]
fn fallback_uses_targets_after_lag_trim() {
    // lag 1 drops the first close; targets [101, 99] -> one diff -> std 0
    let v = backtest_rmse(&[100.0, 101.0, 99.0], 1, DEFAULT_SPLITS);
    assert_eq!(v, 0.0);
}

#[test]
fn fallback_is_zero_with_fewer_than_two_points() {
    assert_eq!(backtest_rmse(&[100.0], 0, DEFAULT_SPLITS), 0.0);
    assert_eq!(backtest_rmse(&[], 3, DEFAULT_SPLITS), 0.0);
}

#[test]
fn threshold_scales_with_split_count() {
    // 15 rows: enough for 5 splits (needs 10) but not for 11 splits (needs 16)
    let closes: Vec<f64> = (0..16).map(|i| 100.0 + (i % 2) as f64).collect();
    let many_splits = backtest_rmse(&closes, 1, 11);
    // alternating targets -> seven +1 and seven -1 diffs -> std 1
    assert!((many_splits - 1.0).abs() < 1e-12, "got {}", many_splits);
    let five_splits = backtest_rmse(&closes, 1, DEFAULT_SPLITS);
    assert!(five_splits.is_finite());
}

#[test]
fn linear_trend_is_predicted_almost_exactly() {
    let closes: Vec<f64> = (0..60).map(|i| 50.0 + 0.5 * i as f64).collect();
    let v = backtest_rmse(&closes, 3, DEFAULT_SPLITS);
    assert!(v >= 0.0);
    assert!(v < 1e-4, "got {}", v);
}

#[test]
fn noisy_series_gives_positive_finite_error() {
    let closes: Vec<f64> = (0..120)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.1 * t + 2.0 * (t * 1.7).sin() + 1.3 * (t * 0.37).cos()
        })
        .collect();
    let v = backtest_rmse(&closes, 5, DEFAULT_SPLITS);
    assert!(v.is_finite());
    assert!(v > 0.0);
}

#[test]
fn folds_never_train_on_the_future() {
    for n in 6..80 {
        for splits in 2..8 {
            let folds = walk_forward_splits(n, splits);
            if folds.is_empty() {
                assert!(n / (splits + 1) == 0);
                continue;
            }
            assert_eq!(folds.len(), splits);
            assert_eq!(folds.last().unwrap().test.end, n);
            for (i, f) in folds.iter().enumerate() {
                assert_eq!(f.train.start, 0);
                assert_eq!(f.train.end, f.test.start);
                assert!(!f.train.is_empty());
                assert!(!f.test.is_empty());
                if i > 0 {
                    assert_eq!(folds[i - 1].test.end, f.test.start);
                    assert!(folds[i - 1].train.end < f.train.end);
                }
            }
        }
    }
}

#[test]
fn oversized_split_count_falls_back_instead_of_overflowing() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
    // targets rise by exactly 1 -> diff volatility 0
    assert_eq!(backtest_rmse(&closes, 3, usize::MAX), 0.0);
    assert!(walk_forward_splits(60, usize::MAX).is_empty());
    assert!(walk_forward_splits(60, usize::MAX - 1).is_empty());
}
