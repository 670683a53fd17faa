use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::HttpBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod controller;
mod ui;

use config::{load_settings, normalize_base_url};
use ui::ShellApp;

#[derive(Parser, Debug)]
#[command(name = "documind", about = "Terminal client for the DocuMind document Q&A service")]
struct Args {
    /// Backend base URL, e.g. http://localhost:8000
    #[arg(long)]
    base_url: Option<String>,
    /// Settings file (defaults to ./documind.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(log_filter) = args.log_filter {
        settings.log_filter = log_filter;
    }
    settings.base_url = normalize_base_url(&settings.base_url)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(base_url = %settings.base_url, "documind starting");
    let backend = HttpBackend::new(&settings.base_url).context("failed to build HTTP client")?;

    let mut app = ShellApp::new(
        Arc::new(backend),
        settings,
        tokio::io::stdin(),
        std::io::stdout(),
    );
    app.run().await
}
