use chrono::NaiveDate;

/// Ticker assigned to every row when the input carries no ticker column.
pub const SINGLE_SERIES_TICKER: &str = "UNK";

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: f64,
}

/// Daily closes grouped by ticker, ascending by date within each ticker.
#[derive(Debug, Clone, Default)]
pub struct PricePanel {
    records: Vec<PriceRecord>,
}

impl PricePanel {
    /// Records must already be sorted by `(ticker, date)`.
    pub(crate) fn from_sorted(records: Vec<PriceRecord>) -> Self {
        debug_assert!(records
            .windows(2)
            .all(|w| (&w[0].ticker, w[0].date) <= (&w[1].ticker, w[1].date)));
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    /// Distinct tickers in panel order.
    pub fn tickers(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.records {
            if out.last().copied() != Some(r.ticker.as_str()) {
                out.push(r.ticker.as_str());
            }
        }
        out
    }

    pub fn contains_ticker(&self, ticker: &str) -> bool {
        !self.series(ticker).is_empty()
    }

    /// The contiguous, date-ordered run of records for one ticker.
    pub fn series(&self, ticker: &str) -> &[PriceRecord] {
        let start = self
            .records
            .partition_point(|r| r.ticker.as_str() < ticker);
        let end = self
            .records
            .partition_point(|r| r.ticker.as_str() <= ticker);
        &self.records[start..end]
    }
}
