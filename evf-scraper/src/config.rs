//! evf-scraper configuration
//!
//! Resolution order per setting: CLI argument, environment variable,
//! TOML file (`--config`), built-in default.

use clap::Parser;
use evf_common::config::{load_toml_or_default, LoggingConfig};
use evf_common::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TARGET: &str = "file://./test-events.html";
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_USER_AGENT: &str = "Eventfinder-Scraper/1.0";
pub const DEFAULT_DELAY_MS: u64 = 500;

/// Command-line arguments for evf-scraper
#[derive(Parser, Debug, Default)]
#[command(name = "evf-scraper")]
#[command(about = "Scrape an event listing page and submit it to the Eventfinder API")]
#[command(version)]
pub struct ScraperArgs {
    /// Listing to scrape: file:// URL, filesystem path or http(s) URL
    /// [default: file://./test-events.html]
    pub target: Option<String>,

    /// Base URL of the Eventfinder API [default: http://localhost:3000/api]
    #[arg(long, env = "EVF_API_URL")]
    pub api_url: Option<String>,

    /// Pause after each submitted event, in milliseconds [default: 500]
    #[arg(long, env = "EVF_DELAY_MS")]
    pub delay_ms: Option<u64>,

    /// TOML config file
    #[arg(short, long, env = "EVF_SCRAPER_CONFIG")]
    pub config: Option<PathBuf>,
}

/// CSS selectors locating events and their fields on a listing page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Selectors {
    pub event: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub date: String,
    pub venue: String,
    pub organizer: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            event: ".event".to_string(),
            title: ".title".to_string(),
            description: ".description".to_string(),
            category: ".category".to_string(),
            date: ".date".to_string(),
            venue: ".venue".to_string(),
            organizer: ".organizer".to_string(),
        }
    }
}

/// TOML config file contents
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScraperToml {
    pub target: Option<String>,
    pub api_url: Option<String>,
    pub delay_ms: Option<u64>,
    pub user_agent: Option<String>,
    #[serde(default)]
    pub selectors: Selectors,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Fully resolved scraper settings
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub target: String,
    pub api_url: String,
    pub delay: Duration,
    pub user_agent: String,
    pub selectors: Selectors,
    pub log_level: String,
}

impl ScraperConfig {
    pub fn from_args(args: ScraperArgs) -> Result<Self> {
        let file: ScraperToml = load_toml_or_default(args.config.as_deref())?;

        Ok(Self {
            target: args
                .target
                .or(file.target)
                .unwrap_or_else(|| DEFAULT_TARGET.to_string()),
            api_url: args
                .api_url
                .or(file.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            delay: Duration::from_millis(args.delay_ms.or(file.delay_ms).unwrap_or(DEFAULT_DELAY_MS)),
            user_agent: file.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            selectors: file.selectors,
            log_level: file.logging.level,
        })
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            selectors: Selectors::default(),
            log_level: "info".to_string(),
        }
    }
}
