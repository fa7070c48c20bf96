//! Scrape run orchestration
//!
//! Candidates are processed strictly one at a time: venue, then organizer,
//! then submission, then a fixed pause before the next one. A candidate whose names cannot be
//! resolved is skipped; a failed submission is logged and the run goes on.

use crate::client::{EventBackend, SaveStatus};
use crate::config::ScraperConfig;
use crate::error::Result;
use crate::extract::{CandidateEvent, EventListing};
use crate::fetch::fetch_content;
use evf_common::models::RecordKind;
use std::time::Duration;

/// Tally of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub extracted: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped_unresolved: usize,
    pub failed: usize,
}

/// Fetch, extract and submit everything on `config.target`
///
/// Only an unreadable target or bad selector configuration fails the run.
pub async fn run(config: &ScraperConfig, backend: &dyn EventBackend) -> Result<RunSummary> {
    let html = fetch_content(&config.target, &config.user_agent).await?;

    // The parsed document is not Send; keep it out of the await points below
    let candidates: Vec<CandidateEvent> = {
        let listing = EventListing::parse_with(&html, &config.selectors)?;
        listing.candidates().collect()
    };
    tracing::info!("Extracted {} candidate events from {}", candidates.len(), config.target);

    let summary = submit_all(&candidates, backend, config.delay).await;
    tracing::info!(
        extracted = summary.extracted,
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped_unresolved,
        failed = summary.failed,
        "Scrape run complete"
    );
    Ok(summary)
}

/// Resolve and submit candidates in order
pub async fn submit_all(
    candidates: &[CandidateEvent],
    backend: &dyn EventBackend,
    delay: Duration,
) -> RunSummary {
    let mut summary = RunSummary {
        extracted: candidates.len(),
        ..RunSummary::default()
    };

    let mut submitted_before = false;
    for candidate in candidates {
        let venue = match backend.normalize(RecordKind::Venue, &candidate.venue_name).await {
            Ok(venue) => venue,
            Err(e) => {
                tracing::warn!(slug = %candidate.slug, "Skipping event, venue {:?} unresolved: {}", candidate.venue_name, e);
                summary.skipped_unresolved += 1;
                continue;
            }
        };
        let organizer = match backend.normalize(RecordKind::Organizer, &candidate.organizer_name).await {
            Ok(organizer) => organizer,
            Err(e) => {
                tracing::warn!(
                    slug = %candidate.slug,
                    "Skipping event, organizer {:?} unresolved: {}",
                    candidate.organizer_name,
                    e
                );
                summary.skipped_unresolved += 1;
                continue;
            }
        };

        // Pace submissions; nothing waits after the last one
        if submitted_before {
            tokio::time::sleep(delay).await;
        }
        submitted_before = true;

        match backend.save_event(&candidate.to_input(&venue, &organizer)).await {
            Ok((event, SaveStatus::Created)) => {
                tracing::info!(slug = %event.slug, id = %event.id, "Created event");
                summary.created += 1;
            }
            Ok((event, SaveStatus::Updated)) => {
                tracing::info!(slug = %event.slug, id = %event.id, "Updated event");
                summary.updated += 1;
            }
            Err(e) => {
                tracing::error!(slug = %candidate.slug, "Failed to save event: {}", e);
                summary.failed += 1;
            }
        }
    }

    summary
}
