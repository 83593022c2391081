mod api;
mod cli;
mod commands;
mod config;
mod error;
mod lifecycle;
mod ui;
mod view;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use config::LesConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose { "les=debug" } else { "les=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = LesConfig::load().context("failed to load configuration")?;
    if let Some(url) = cli.api_url.as_deref() {
        config.api_url = url.to_string();
    }
    tracing::debug!(api_url = %config.api_url, poll_interval_ms = config.poll_interval_ms, "configuration loaded");

    let client = api::LesClient::new(&config.api_url, config.request_timeout())
        .map_err(error::LesError::from)
        .context("failed to build LES client")?;
    commands::run(cli.command, Arc::new(client), &config).await
}
