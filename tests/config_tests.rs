use lagcast::config::{Config, ForecastConfig};
use lagcast::pipeline::{DEFAULT_HORIZON, DEFAULT_LAGS, DEFAULT_ROW_WINDOW};

#[test]
fn parse_default_toml() {
    let toml_str = r#"
[forecast]
lags = 12
horizon = 15
row_window = 2500
splits = 4

[data]
source = "./prices.parquet"

[server]
bind = "0.0.0.0:9000"

[logging]
level = "debug"
json = true
"#;
    let config = Config::from_toml_str(toml_str).unwrap();
    assert_eq!(config.forecast.lags, 12);
    assert_eq!(config.forecast.horizon, 15);
    assert_eq!(config.forecast.row_window, 2500);
    assert_eq!(config.forecast.splits, 4);
    assert_eq!(config.data.source, "./prices.parquet");
    assert_eq!(config.server.bind_addr().unwrap().port(), 9000);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
    assert!(config.validate().is_ok());
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.forecast.lags, DEFAULT_LAGS);
    assert_eq!(config.forecast.horizon, DEFAULT_HORIZON);
    assert_eq!(config.forecast.row_window, DEFAULT_ROW_WINDOW);
    assert_eq!(config.forecast.splits, 5);
    assert_eq!(config.server.bind, "127.0.0.1:8000");
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.json);
}

#[test]
fn bundled_config_file_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
    let config = Config::from_toml_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.forecast.lags, DEFAULT_LAGS);
    assert_eq!(config.forecast.horizon, DEFAULT_HORIZON);
}

#[test]
fn malformed_toml_is_rejected() {
    assert!(Config::from_toml_str("[forecast]\nlags = \"ten\"\n").is_err());
}

#[test]
fn request_carries_configured_defaults() {
    let cfg = ForecastConfig {
        lags: 7,
        horizon: 3,
        row_window: 100,
        splits: 4,
    };
    let req = cfg.request("aapl");
    assert_eq!(req.ticker, "aapl");
    assert_eq!(req.lags, 7);
    assert_eq!(req.horizon, 3);
    assert_eq!(req.row_window, 100);
    assert_eq!(req.splits, 4);
}
