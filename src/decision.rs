use serde::Serialize;

const MIN_HORIZON_RETURN: f64 = 0.03;
const MAX_PRED_DRAWDOWN: f64 = 0.025;
const RETURN_TO_UNCERT_MIN: f64 = 2.0;
const POSITION_UNCERT_MULT: f64 = 3.0;
const TAKE_PROFIT_MULT: f64 = 2.0;
const MIN_VOTES: usize = 2;

/// Buy/hold verdict with sizing and risk bands derived from a forecast path.
/// Relative levels are fractions of the last close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecisionReport {
    pub pred_return_h: f64,
    pub uncert_h: f64,
    /// `+inf` when the horizon uncertainty is zero.
    pub signal_to_noise: f64,
    pub slope_pred: f64,
    pub max_drawdown_pred: f64,
    pub buy: bool,
    pub suggested_position_0to1: f64,
    pub stop_loss_rel: f64,
    pub take_profit_rel: f64,
}

/// Least-squares slope of `values` against `0..len`.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / nf;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    sxy / sxx
}

/// Largest fractional fall from a running peak.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for v in values {
        peak = peak.max(*v);
        if peak != 0.0 {
            worst = worst.max((peak - v) / peak);
        }
    }
    worst
}

pub fn evaluate_decision(
    last_close: f64,
    path: &[f64],
    rmse_daily: f64,
    horizon: usize,
) -> DecisionReport {
    let pred_return_h = match path.last() {
        Some(last) => last / last_close - 1.0,
        None => 0.0,
    };
    let uncert_h = if last_close > 0.0 {
        (horizon as f64).sqrt() * rmse_daily / last_close
    } else {
        0.0
    };
    let slope_pred = linear_slope(path);
    let max_drawdown_pred = max_drawdown(path);

    let votes = [
        pred_return_h > RETURN_TO_UNCERT_MIN * uncert_h,
        slope_pred > 0.0 && pred_return_h > MIN_HORIZON_RETURN,
        max_drawdown_pred < MAX_PRED_DRAWDOWN,
    ];
    let buy = votes.iter().filter(|v| **v).count() >= MIN_VOTES;

    let signal_to_noise = if uncert_h > 0.0 {
        pred_return_h / uncert_h
    } else {
        f64::INFINITY
    };
    let suggested_position_0to1 = if buy && uncert_h > 0.0 {
        (pred_return_h / (POSITION_UNCERT_MULT * uncert_h)).clamp(0.0, 1.0)
    } else {
        0.0
    };

    DecisionReport {
        pred_return_h,
        uncert_h,
        signal_to_noise,
        slope_pred,
        max_drawdown_pred,
        buy,
        suggested_position_0to1,
        stop_loss_rel: -uncert_h,
        take_profit_rel: TAKE_PROFIT_MULT * uncert_h,
    }
}
