//! Error types for evf-scraper

use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the Eventfinder API
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server answered with a non-2xx status; message from its `{error}` body
    #[error("API returned {0}: {1}")]
    Api(StatusCode, String),

    /// Connection, timeout or body decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Failures that abort a scrape run
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Scrape target could not be read or fetched
    #[error("Failed to fetch {target}: {reason}")]
    Fetch { target: String, reason: String },

    /// A configured CSS selector does not parse
    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
