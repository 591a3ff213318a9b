use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

use crate::backtest::DEFAULT_SPLITS;
use crate::pipeline::{
    ForecastRequest, DEFAULT_HORIZON, DEFAULT_LAGS, DEFAULT_ROW_WINDOW, MAX_HORIZON, MAX_LAGS,
    MAX_SPLITS,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_lags")]
    pub lags: usize,
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    #[serde(default = "default_row_window")]
    pub row_window: usize,
    #[serde(default = "default_splits")]
    pub splits: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lags: DEFAULT_LAGS,
            horizon: DEFAULT_HORIZON,
            row_window: DEFAULT_ROW_WINDOW,
            splits: DEFAULT_SPLITS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_source")]
    pub source: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
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

fn default_source() -> String {
    "./stock_data_since_2016.parquet".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

impl ForecastConfig {
    /// A request for `ticker` carrying these defaults.
    pub fn request(&self, ticker: &str) -> ForecastRequest {
        ForecastRequest {
            ticker: ticker.to_string(),
            lags: self.lags,
            horizon: self.horizon,
            row_window: self.row_window,
            splits: self.splits,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .trim()
            .parse()
            .with_context(|| format!("invalid server.bind '{}'", self.bind))
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = path.as_ref();
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;

        let mut config = Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        if let Ok(source) = std::env::var("LAGCAST_SOURCE") {
            if !source.trim().is_empty() {
                config.data.source = source;
            }
        }
        if let Ok(bind) = std::env::var("LAGCAST_BIND") {
            if !bind.trim().is_empty() {
                config.server.bind = bind;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("invalid config TOML")
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_LAGS).contains(&self.forecast.lags) {
            bail!("forecast.lags must be between 1 and {}", MAX_LAGS);
        }
        if !(1..=MAX_HORIZON).contains(&self.forecast.horizon) {
            bail!("forecast.horizon must be between 1 and {}", MAX_HORIZON);
        }
        if !(2..=MAX_SPLITS).contains(&self.forecast.splits) {
            bail!("forecast.splits must be between 2 and {}", MAX_SPLITS);
        }
        self.server
            .bind_addr()
            .context("server.bind is invalid")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.forecast.lags = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.forecast.splits = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.forecast.horizon = MAX_HORIZON + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.bind = "not-an-addr".to_string();
        assert!(config.validate().is_err());
    }
}
