use std::collections::VecDeque;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{ForecastError, Result};
use crate::features::LagFeatureMatrix;

// Ridge added to the normal equations, relative to the sample count. Keeps
// Cholesky well-posed when lag columns are perfectly collinear; escalated
// tenfold per failed factorization.
const RIDGE_REL: f64 = 1e-8;
const RIDGE_ATTEMPTS: usize = 8;

/// A one-step model over a most-recent-first window of closes.
pub trait Predictor {
    fn lags(&self) -> usize;
    fn predict(&self, window: &[f64]) -> f64;
}

/// Per-column z-scoring with population statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(features: &[Vec<f64>], width: usize) -> Self {
        let n = features.len().max(1) as f64;
        let mut mean = vec![0.0; width];
        for row in features {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += *x;
            }
        }
        for m in &mut mean {
            *m /= n;
        }
        let mut var = vec![0.0; width];
        for row in features {
            for (j, x) in row.iter().enumerate().take(width) {
                let d = *x - mean[j];
                var[j] += d * d;
            }
        }
        let scale = var
            .iter()
            .zip(&mean)
            .map(|(v, m)| {
                let sd = (v / n).max(0.0).sqrt();
                if sd <= 1e-12 * m.abs().max(1.0) {
                    1.0
                } else {
                    sd
                }
            })
            .collect();
        Self { mean, scale }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }
}

/// Ordinary least squares with intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegression {
    pub fn fit(x: &[Vec<f64>], y: &[f64], width: usize) -> Self {
        let n = y.len();
        if n == 0 {
            return Self {
                intercept: 0.0,
                coefficients: vec![0.0; width],
            };
        }
        let nf = n as f64;
        let y_mean = y.iter().sum::<f64>() / nf;
        let mut x_mean = vec![0.0; width];
        for row in x {
            for (m, v) in x_mean.iter_mut().zip(row) {
                *m += *v / nf;
            }
        }

        let mut xtx = vec![vec![0.0; width]; width];
        let mut xty = vec![0.0; width];
        let mut centered = vec![0.0; width];
        for (row, target) in x.iter().zip(y) {
            for j in 0..width {
                centered[j] = row[j] - x_mean[j];
            }
            let dy = target - y_mean;
            for i in 0..width {
                xty[i] += centered[i] * dy;
                for j in 0..=i {
                    xtx[i][j] += centered[i] * centered[j];
                }
            }
        }
        for i in 0..width {
            for j in 0..i {
                xtx[j][i] = xtx[i][j];
            }
        }

        let coefficients = solve_normal_equations(&xtx, &xty, nf);
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(b, m)| b * m)
                .sum::<f64>();
        Self {
            intercept,
            coefficients,
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

fn solve_normal_equations(xtx: &[Vec<f64>], xty: &[f64], n_samples: f64) -> Vec<f64> {
    let width = xty.len();
    let mut ridge = RIDGE_REL * n_samples.max(1.0);
    for _ in 0..RIDGE_ATTEMPTS {
        let mut a = xtx.to_vec();
        for (i, row) in a.iter_mut().enumerate() {
            row[i] += ridge;
        }
        if let Some(beta) = cholesky_solve(&a, xty) {
            return beta;
        }
        ridge *= 10.0;
    }
    tracing::warn!(width, "Normal equations could not be factorized; using zero coefficients");
    vec![0.0; width]
}

fn cholesky_solve(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if !sum.is_finite() || sum <= 0.0 {
                    return None;
                }
                l[i][i] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut s = b[i];
        for k in 0..i {
            s -= l[i][k] * z[k];
        }
        z[i] = s / l[i][i];
    }
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut s = z[i];
        for k in (i + 1)..n {
            s -= l[k][i] * x[k];
        }
        x[i] = s / l[i][i];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// Standardizer followed by a linear regressor, fit once on a lag matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastModel {
    lags: usize,
    scaler: StandardScaler,
    regressor: LinearRegression,
}

impl ForecastModel {
    pub fn fit(matrix: &LagFeatureMatrix) -> Result<Self> {
        if matrix.is_empty() {
            return Err(ForecastError::InsufficientHistory {
                available: 0,
                required: 1,
            });
        }
        let lags = matrix.lags();
        let scaler = StandardScaler::fit(matrix.features(), lags);
        let scaled: Vec<Vec<f64>> = matrix
            .features()
            .iter()
            .map(|row| scaler.transform(row))
            .collect();
        let regressor = LinearRegression::fit(&scaled, matrix.targets(), lags);
        Ok(Self {
            lags,
            scaler,
            regressor,
        })
    }

    pub fn predict_matrix(&self, matrix: &LagFeatureMatrix) -> Vec<f64> {
        matrix.features().iter().map(|row| self.predict(row)).collect()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn regressor(&self) -> &LinearRegression {
        &self.regressor
    }
}

impl Predictor for ForecastModel {
    fn lags(&self) -> usize {
        self.lags
    }

    fn predict(&self, window: &[f64]) -> f64 {
        assert_eq!(
            window.len(),
            self.lags,
            "feature window length must equal the fitted lag depth"
        );
        self.regressor.predict(&self.scaler.transform(window))
    }
}

/// Project `steps` values ahead, feeding each prediction back in as the
/// newest lag. `last_values` is most-recent-first and must be exactly
/// `model.lags()` long.
pub fn forecast_recursive<P: Predictor + ?Sized>(
    last_values: &[f64],
    model: &P,
    steps: usize,
) -> Vec<f64> {
    assert_eq!(
        last_values.len(),
        model.lags(),
        "seed window length must equal the fitted lag depth"
    );
    let mut window: VecDeque<f64> = last_values.iter().copied().collect();
    let mut out = Vec::new();
    for _ in 0..steps {
        let y_hat = model.predict(window.make_contiguous());
        out.push(y_hat);
        window.push_front(y_hat);
        window.pop_back();
    }
    out
}

/// The `count` weekdays following `last`, or `None` when the calendar ends
/// before `count` of them.
pub fn next_business_days(last: NaiveDate, count: usize) -> Option<Vec<NaiveDate>> {
    let mut out = Vec::new();
    let mut day = last;
    while out.len() < count {
        day = day.succ_opt()?;
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(day);
        }
    }
    Some(out)
}
