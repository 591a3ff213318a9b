use chrono::NaiveDate;
use serde::Serialize;

use crate::decision::DecisionReport;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub ticker: String,
    pub pred_close: f64,
}

/// Predicted closes paired with the business dates they fall on.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPath {
    values: Vec<f64>,
    dates: Vec<NaiveDate>,
}

impl ForecastPath {
    pub fn new(values: Vec<f64>, dates: Vec<NaiveDate>) -> Self {
        assert_eq!(
            values.len(),
            dates.len(),
            "forecast values and dates must have equal length"
        );
        Self { values, dates }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn points(&self, ticker: &str) -> Vec<ForecastPoint> {
        self.dates
            .iter()
            .zip(&self.values)
            .map(|(date, v)| ForecastPoint {
                date: *date,
                ticker: ticker.to_string(),
                pred_close: *v,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub ticker: String,
    pub last_close: f64,
    pub pred_last: f64,
    pub horizon: usize,
    pub lags: usize,
    pub forecast: Vec<ForecastPoint>,
    pub decision: DecisionReport,
}
