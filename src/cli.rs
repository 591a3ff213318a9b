use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};

use crate::config::Config;
use crate::export::{
    render_decision_report, render_forecast_head, write_decision_json, write_forecast_csv,
};
use crate::pipeline::{run_forecast, ForecastRequest};
use crate::server::{serve, ServerState};
use crate::source::FileSource;

const PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Forecast(ForecastArgs),
    Serve { bind: Option<String> },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastArgs {
    pub request: ForecastRequest,
    pub source: Option<PathBuf>,
    pub out_csv: Option<PathBuf>,
    pub decision_json: Option<PathBuf>,
}

fn flag_value<'a>(flag: &str, it: &mut impl Iterator<Item = &'a String>) -> Result<&'a str> {
    it.next()
        .map(String::as_str)
        .ok_or_else(|| anyhow!("`{}` requires a value", flag))
}

fn parse_count(flag: &str, raw: &str) -> Result<usize> {
    raw.parse()
        .with_context(|| format!("`{}` expects a non-negative integer, got '{}'", flag, raw))
}

/// Parse arguments after the program name. Omitted numeric flags take the
/// values from `config`.
pub fn parse_args(args: &[String], config: &Config) -> Result<Command> {
    let Some(sub) = args.first() else {
        return Ok(Command::Help);
    };
    let mut it = args[1..].iter();
    match sub.as_str() {
        "forecast" => {
            let mut ticker: Option<String> = None;
            let mut request = config.forecast.request("");
            let mut source = None;
            let mut out_csv = None;
            let mut decision_json = None;
            while let Some(flag) = it.next() {
                match flag.as_str() {
                    "--ticker" => ticker = Some(flag_value(flag, &mut it)?.to_string()),
                    "--source" | "--parquet" => {
                        source = Some(PathBuf::from(flag_value(flag, &mut it)?))
                    }
                    "--lags" => request.lags = parse_count(flag, flag_value(flag, &mut it)?)?,
                    "--horizon" => {
                        request.horizon = parse_count(flag, flag_value(flag, &mut it)?)?
                    }
                    "--row-window" | "--per-rows" => {
                        request.row_window = parse_count(flag, flag_value(flag, &mut it)?)?
                    }
                    "--splits" => request.splits = parse_count(flag, flag_value(flag, &mut it)?)?,
                    "--out-csv" => out_csv = Some(PathBuf::from(flag_value(flag, &mut it)?)),
                    "--decision-json" => {
                        decision_json = Some(PathBuf::from(flag_value(flag, &mut it)?))
                    }
                    other => bail!("unknown flag `{}` for `forecast`", other),
                }
            }
            request.ticker = ticker.ok_or_else(|| anyhow!("`forecast` requires --ticker"))?;
            Ok(Command::Forecast(ForecastArgs {
                request,
                source,
                out_csv,
                decision_json,
            }))
        }
        "serve" => {
            let mut bind = None;
            while let Some(flag) = it.next() {
                match flag.as_str() {
                    "--bind" => bind = Some(flag_value(flag, &mut it)?.to_string()),
                    other => bail!("unknown flag `{}` for `serve`", other),
                }
            }
            Ok(Command::Serve { bind })
        }
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => bail!(
            "unknown subcommand `{}`. expected one of: forecast|serve|help",
            other
        ),
    }
}

pub async fn run_cli(args: &[String], config: &Config) -> Result<()> {
    match parse_args(args, config)? {
        Command::Forecast(fa) => {
            tokio::task::spawn_blocking({
                let config = config.clone();
                move || run_forecast_command(&fa, &config)
            })
            .await
            .context("forecast task aborted")?
        }
        Command::Serve { bind } => {
            let mut server_cfg = config.server.clone();
            if let Some(b) = bind {
                server_cfg.bind = b;
            }
            let addr = server_cfg.bind_addr()?;
            let source = FileSource::new(&config.data.source);
            let state = ServerState::new(Arc::new(source), config.forecast.clone());
            serve(addr, state).await
        }
        Command::Help => {
            print_usage();
            Ok(())
        }
    }
}

fn run_forecast_command(args: &ForecastArgs, config: &Config) -> Result<()> {
    let source_path = args
        .source
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.data.source));
    let source = FileSource::new(source_path);
    let report = run_forecast(&source, &args.request)?;

    let csv_path = args
        .out_csv
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("forecast_{}.csv", report.ticker)));
    write_forecast_csv(&csv_path, &report)
        .with_context(|| format!("failed to write {}", csv_path.display()))?;
    println!("Saved forecast -> {}", csv_path.display());
    print!("{}", render_forecast_head(&report, PREVIEW_ROWS));

    println!();
    print!("{}", render_decision_report(&report));

    if let Some(path) = &args.decision_json {
        write_decision_json(path, &report)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Saved decision JSON -> {}", path.display());
    }
    Ok(())
}

fn print_usage() {
    println!("lagcast <command> [flags]");
    println!();
    println!("commands:");
    println!("  forecast --ticker T [--source PATH] [--lags N] [--horizon N]");
    println!("           [--row-window N] [--splits N] [--out-csv PATH] [--decision-json PATH]");
    println!("  serve    [--bind ADDR]");
    println!("  help");
}
