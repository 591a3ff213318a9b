use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{ForecastError, Result};
use crate::model::panel::{PricePanel, PriceRecord, SINGLE_SERIES_TICKER};
use crate::source::RawTable;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%#z", "%Y-%m-%d %H:%M:%S%.f%#z"];

/// Lower-cased, trimmed column name with provider synonyms folded in.
pub fn normalize_column(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    match lower.as_str() {
        "timestamp" => "date".to_string(),
        "symbol" => "ticker".to_string(),
        _ => lower,
    }
}

/// Coerce a date-like cell to a calendar date. Time-of-day is discarded.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.date_naive());
        }
    }
    None
}

fn parse_close(raw: &str) -> Option<f64> {
    let v: f64 = raw.trim().parse().ok()?;
    (v.is_finite() && v > 0.0).then_some(v)
}

fn cell(row: &[Option<String>], idx: usize) -> Option<&str> {
    row.get(idx)
        .and_then(|c| c.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Validate and normalize a raw table into a [`PricePanel`].
///
/// Rows with an unparseable date, a blank ticker or an unusable close are
/// dropped. Rows sharing a `(ticker, date)` key collapse to the last one in
/// input order.
pub fn load_panel(table: RawTable) -> Result<PricePanel> {
    let columns: Vec<String> = table.columns.iter().map(|c| normalize_column(c)).collect();
    let position = |name: &str| columns.iter().position(|c| c == name);

    let (date_idx, close_idx, ticker_idx) =
        (position("date"), position("close"), position("ticker"));
    let (Some(date_idx), Some(close_idx)) = (date_idx, close_idx) else {
        return Err(ForecastError::Schema { columns });
    };

    let total = table.rows.len();
    let mut records: Vec<PriceRecord> = Vec::with_capacity(total);
    for row in &table.rows {
        let ticker = match ticker_idx {
            Some(idx) => match cell(row, idx) {
                Some(t) => t.to_ascii_uppercase(),
                None => continue,
            },
            None => SINGLE_SERIES_TICKER.to_string(),
        };
        let Some(date) = cell(row, date_idx).and_then(parse_date) else {
            continue;
        };
        let Some(close) = cell(row, close_idx).and_then(parse_close) else {
            continue;
        };
        records.push(PriceRecord {
            ticker,
            date,
            close,
        });
    }
    let dropped = total - records.len();
    if dropped > 0 {
        tracing::debug!(dropped, total, "Dropped rows failing data-quality filter");
    }

    // Stable: equal keys keep input order, so the last duplicate wins below.
    records.sort_by(|a, b| a.ticker.cmp(&b.ticker).then(a.date.cmp(&b.date)));
    let before = records.len();
    let records = dedup_keep_last(records);
    let collapsed = before - records.len();
    if collapsed > 0 {
        tracing::warn!(collapsed, "Collapsed duplicate (ticker, date) rows, keeping last");
    }

    Ok(PricePanel::from_sorted(records))
}

fn dedup_keep_last(records: Vec<PriceRecord>) -> Vec<PriceRecord> {
    let mut out: Vec<PriceRecord> = Vec::with_capacity(records.len());
    for r in records {
        match out.last_mut() {
            Some(prev) if prev.ticker == r.ticker && prev.date == r.date => *prev = r,
            _ => out.push(r),
        }
    }
    out
}
