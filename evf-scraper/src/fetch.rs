//! Loading the listing page
//!
//! `file://` URLs and bare paths are read from disk, `http(s)://` URLs are
//! fetched. Either way the whole page is returned as one string.

use crate::error::{Result, ScrapeError};
use reqwest::Url;
use std::path::PathBuf;

/// Read or download `target`
pub async fn fetch_content(target: &str, user_agent: &str) -> Result<String> {
    let fail = |reason: String| ScrapeError::Fetch {
        target: target.to_string(),
        reason,
    };

    if target.starts_with("http://") || target.starts_with("https://") {
        tracing::info!("Fetching {}", target);
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| fail(e.to_string()))?;
        let response = client
            .get(target)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fail(format!("HTTP {}", response.status())));
        }
        return response.text().await.map_err(|e| fail(e.to_string()));
    }

    let path = local_path(target).ok_or_else(|| fail("not a file URL".to_string()))?;
    tracing::info!("Reading {}", path.display());
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| fail(e.to_string()))
}

/// Filesystem path for a `file://` URL (percent-decoded) or a bare path
fn local_path(target: &str) -> Option<PathBuf> {
    let Some(rest) = target.strip_prefix("file://") else {
        return Some(PathBuf::from(target));
    };
    let url = if rest.starts_with('/') {
        Url::parse(target).ok()?
    } else {
        // file://./relative resolves against the working directory
        let cwd = std::env::current_dir().ok()?;
        Url::from_directory_path(cwd).ok()?.join(rest).ok()?
    };
    url.to_file_path().ok()
}
