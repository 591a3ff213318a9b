use serde::Deserialize;

use crate::backtest::{backtest_rmse, DEFAULT_SPLITS};
use crate::decision::evaluate_decision;
use crate::error::{ForecastError, Result};
use crate::features::make_supervised;
use crate::forecaster::{forecast_recursive, next_business_days, ForecastModel};
use crate::loader::load_panel;
use crate::model::forecast::{ForecastPath, ForecastReport};
use crate::model::panel::PricePanel;
use crate::source::PanelSource;

pub const DEFAULT_LAGS: usize = 10;
pub const DEFAULT_HORIZON: usize = 20;
pub const DEFAULT_ROW_WINDOW: usize = 5000;
/// Rows beyond the lag depth a series needs before fitting is attempted.
pub const HISTORY_MARGIN: usize = 5;
/// Upper bounds on request parameters.
pub const MAX_LAGS: usize = 1_000;
pub const MAX_HORIZON: usize = 2_520;
pub const MAX_SPLITS: usize = 100;
const TICKER_SAMPLE_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForecastRequest {
    pub ticker: String,
    #[serde(default = "default_lags")]
    pub lags: usize,
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    /// Trailing rows of the ticker's history to use; 0 keeps everything.
    #[serde(default = "default_row_window", alias = "per_rows")]
    pub row_window: usize,
    #[serde(default = "default_splits")]
    pub splits: usize,
}

fn default_lags() -> usize {
    DEFAULT_LAGS
}

fn default_horizon() -> usize {
    DEFAULT_HORIZON
}

fn default_row_window() -> usize {
    DEFAULT_ROW_WINDOW
}

fn default_splits() -> usize {
    DEFAULT_SPLITS
}

impl ForecastRequest {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            lags: DEFAULT_LAGS,
            horizon: DEFAULT_HORIZON,
            row_window: DEFAULT_ROW_WINDOW,
            splits: DEFAULT_SPLITS,
        }
    }

    /// Trimmed, upper-cased copy after range checks.
    pub fn normalized(&self) -> Result<Self> {
        let ticker = self.ticker.trim().to_ascii_uppercase();
        if ticker.is_empty() {
            return Err(ForecastError::InvalidRequest(
                "ticker must not be empty".to_string(),
            ));
        }
        if !(1..=MAX_LAGS).contains(&self.lags) {
            return Err(ForecastError::InvalidRequest(format!(
                "lags must be between 1 and {}",
                MAX_LAGS
            )));
        }
        if !(1..=MAX_HORIZON).contains(&self.horizon) {
            return Err(ForecastError::InvalidRequest(format!(
                "horizon must be between 1 and {}",
                MAX_HORIZON
            )));
        }
        if !(2..=MAX_SPLITS).contains(&self.splits) {
            return Err(ForecastError::InvalidRequest(format!(
                "splits must be between 2 and {}",
                MAX_SPLITS
            )));
        }
        Ok(Self {
            ticker,
            ..self.clone()
        })
    }
}

/// Load the source, then forecast one ticker.
pub fn run_forecast<S: PanelSource + ?Sized>(
    source: &S,
    request: &ForecastRequest,
) -> Result<ForecastReport> {
    let request = request.normalized()?;
    let panel = load_panel(source.load_table()?)?;
    tracing::info!(
        source = %source.describe(),
        rows = panel.len(),
        tickers = panel.tickers().len(),
        "Loaded price panel"
    );
    forecast_panel(&panel, &request)
}

pub fn forecast_panel(panel: &PricePanel, request: &ForecastRequest) -> Result<ForecastReport> {
    let request = request.normalized()?;
    let ticker = request.ticker.as_str();

    let series = panel.series(ticker);
    if series.is_empty() {
        return Err(ForecastError::TickerNotFound {
            ticker: ticker.to_string(),
            sample: panel
                .tickers()
                .into_iter()
                .take(TICKER_SAMPLE_LIMIT)
                .map(str::to_string)
                .collect(),
        });
    }
    let series = if request.row_window > 0 && series.len() > request.row_window {
        &series[series.len() - request.row_window..]
    } else {
        series
    };

    let closes: Vec<f64> = series.iter().map(|r| r.close).collect();
    let required = request.lags.saturating_add(HISTORY_MARGIN + 1);
    if closes.len() < required {
        return Err(ForecastError::InsufficientHistory {
            available: closes.len(),
            required,
        });
    }

    let Some(latest) = series.last() else {
        return Err(ForecastError::InsufficientHistory {
            available: 0,
            required,
        });
    };
    let last_close = latest.close;
    let Some(dates) = next_business_days(latest.date, request.horizon) else {
        return Err(ForecastError::InvalidRequest(format!(
            "horizon of {} business days runs past the calendar after {}",
            request.horizon, latest.date
        )));
    };

    let matrix = make_supervised(&closes, request.lags);
    let model = ForecastModel::fit(&matrix)?;
    let seed: Vec<f64> = closes.iter().rev().take(request.lags).copied().collect();
    let values = forecast_recursive(&seed, &model, request.horizon);
    let path = ForecastPath::new(values, dates);

    let rmse_daily = backtest_rmse(&closes, request.lags, request.splits);
    let decision = evaluate_decision(last_close, path.values(), rmse_daily, request.horizon);
    let pred_last = path.last().unwrap_or(last_close);

    tracing::info!(
        ticker,
        rows = closes.len(),
        lags = request.lags,
        horizon = request.horizon,
        last_close,
        pred_last,
        rmse_daily,
        buy = decision.buy,
        "Forecast complete"
    );

    Ok(ForecastReport {
        ticker: ticker.to_string(),
        last_close,
        pred_last,
        horizon: request.horizon,
        lags: request.lags,
        forecast: path.points(ticker),
        decision,
    })
}
