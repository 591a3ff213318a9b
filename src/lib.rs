pub mod backtest;
pub mod cli;
pub mod config;
pub mod decision;
pub mod error;
pub mod export;
pub mod features;
pub mod forecaster;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod server;
pub mod source;
