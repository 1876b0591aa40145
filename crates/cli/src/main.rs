use std::process::ExitCode;

use anyhow::Result;
use tripwise_core::{AppConfig, LoadOptions, LoggingConfig};

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    use tripwise_core::LogFormat::*;
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match logging.format {
        Compact => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .compact()
            .try_init(),
        Pretty => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .pretty()
            .try_init(),
        Json => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .json()
            .try_init(),
    }
    .map_err(|error| anyhow::anyhow!("failed to initialize logging: {error}"))
}

fn main() -> Result<ExitCode> {
    // A broken configuration must still reach the command layer so it can be
    // reported in the command envelope; logging falls back to defaults.
    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    init_logging(&logging)?;

    Ok(tripwise_cli::run())
}
