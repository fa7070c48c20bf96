//! evf-scraper - Eventfinder listing scraper
//!
//! One-shot batch: fetch the target, extract events, submit them to the API,
//! log a summary and exit.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use evf_scraper::config::{ScraperArgs, ScraperConfig};
use evf_scraper::ApiClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ScraperConfig::from_args(ScraperArgs::parse())?;

    evf_common::config::init_tracing(&config.log_level);

    info!(
        "Starting evf-scraper v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("API: {}", config.api_url);

    let client = ApiClient::new(&config.api_url, &config.user_agent).context("Failed to create API client")?;

    let summary = evf_scraper::run(&config, &client)
        .await
        .with_context(|| format!("Scrape of {} failed", config.target))?;

    info!(
        "Done: {} extracted, {} created, {} updated, {} skipped, {} failed",
        summary.extracted, summary.created, summary.updated, summary.skipped_unresolved, summary.failed
    );
    Ok(())
}
