use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::decision::DecisionReport;
use crate::error::Result;
use crate::model::forecast::ForecastReport;

/// Flat JSON shape of a saved decision: headline prices merged with the
/// decision metrics.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionSummary<'a> {
    pub ticker: &'a str,
    pub last_close: f64,
    pub pred_last: f64,
    #[serde(flatten)]
    pub decision: &'a DecisionReport,
}

impl<'a> From<&'a ForecastReport> for DecisionSummary<'a> {
    fn from(report: &'a ForecastReport) -> Self {
        Self {
            ticker: &report.ticker,
            last_close: report.last_close,
            pred_last: report.pred_last,
            decision: &report.decision,
        }
    }
}

pub fn write_forecast_csv<P: AsRef<Path>>(path: P, report: &ForecastReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for point in &report.forecast {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn decision_json(report: &ForecastReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(&DecisionSummary::from(report))?)
}

pub fn write_decision_json<P: AsRef<Path>>(path: P, report: &ForecastReport) -> Result<()> {
    std::fs::write(path.as_ref(), decision_json(report)?)?;
    Ok(())
}

/// First `rows` forecast rows as an aligned text table.
pub fn render_forecast_head(report: &ForecastReport, rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>10}  {:<8} {:>14}", "date", "ticker", "pred_close");
    for p in report.forecast.iter().take(rows) {
        let _ = writeln!(out, "{:>10}  {:<8} {:>14.6}", p.date, p.ticker, p.pred_close);
    }
    out
}

pub fn render_decision_report(report: &ForecastReport) -> String {
    let d = &report.decision;
    let fields: [(&str, String); 12] = [
        ("ticker", report.ticker.clone()),
        ("last_close", report.last_close.to_string()),
        ("pred_last", report.pred_last.to_string()),
        ("pred_return_h", d.pred_return_h.to_string()),
        ("uncert_h", d.uncert_h.to_string()),
        ("signal_to_noise", d.signal_to_noise.to_string()),
        ("slope_pred", d.slope_pred.to_string()),
        ("max_drawdown_pred", d.max_drawdown_pred.to_string()),
        ("buy", d.buy.to_string()),
        ("suggested_position_0to1", d.suggested_position_0to1.to_string()),
        ("stop_loss_rel", d.stop_loss_rel.to_string()),
        ("take_profit_rel", d.take_profit_rel.to_string()),
    ];
    let mut out = String::from("=== DECISION REPORT ===\n");
    for (name, value) in fields {
        let _ = writeln!(out, "{:>23}: {}", name, value);
    }
    out
}
