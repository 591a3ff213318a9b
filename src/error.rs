use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("schema error: need `date` and `close` columns, found {columns:?}")]
    Schema { columns: Vec<String> },

    #[error("ticker '{ticker}' not found. sample: {sample:?}")]
    TickerNotFound { ticker: String, sample: Vec<String> },

    #[error("not enough history for the chosen lags: have {available} rows, need {required}")]
    InsufficientHistory { available: usize, required: usize },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("source error: {0}")]
    Source(String),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForecastError {
    /// True when the caller can succeed by changing its input; false for
    /// failures of the environment (files, database, serialization).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ForecastError::Schema { .. }
                | ForecastError::TickerNotFound { .. }
                | ForecastError::InsufficientHistory { .. }
                | ForecastError::InvalidRequest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
