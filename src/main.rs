//! Clinic Booking - Main Entry Point
//!
//! Interactive console for the patient booking wizard and the clinic admin board.

use anyhow::Context;
use clinic_booking::app::application::run_app;
use clinic_booking::constants::LOG_FILE_PREFIX;
use clinic_booking::helpers::{get_or_create_data_dir, is_development, load_config};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_dir = get_or_create_data_dir().context("create data directory")?;
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    let level = if is_development() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout carries the console view, so terminal logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    tracing::info!("Starting clinic booking console...");

    let config = load_config().context("load configuration")?;
    run_app(config).await?;

    tracing::info!("Clinic booking console stopped");
    Ok(())
}
