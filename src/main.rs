use anyhow::Result;

use lagcast::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load config
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure config/default.toml exists (see README for the layout)");
            std::process::exit(1);
        }
    };

    // Init tracing on stderr so stdout stays clean for reports
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config
            .logging
            .level
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.with_ansi(false).json().init();
    } else {
        builder.init();
    }

    tracing::info!(
        source = %config.data.source,
        lags = config.forecast.lags,
        horizon = config.forecast.horizon,
        "Starting lagcast"
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = lagcast::cli::run_cli(&args, &config).await {
        tracing::error!(error = %format!("{:#}", e), "Command failed");
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
