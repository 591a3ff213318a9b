pub mod forecast;
pub mod panel;

pub use forecast::{ForecastPath, ForecastPoint, ForecastReport};
pub use panel::{PricePanel, PriceRecord, SINGLE_SERIES_TICKER};
