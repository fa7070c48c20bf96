//! Turning a listing page into candidate events
//!
//! Each element matching the event selector yields at most one candidate.
//! Elements missing a required field, or whose date does not parse, are
//! skipped with a warning; extraction never fails part-way.

use crate::config::Selectors;
use crate::error::{Result, ScrapeError};
use chrono::{DateTime, Utc};
use evf_common::models::{DateRange, EventInput, Location, NormalizedRef};
use evf_common::{slugify, time};
use scraper::{ElementRef, Html, Selector};

/// One event as read off the page, before name resolution
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEvent {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub start: DateTime<Utc>,
    pub venue_name: String,
    pub organizer_name: String,
    pub slug: String,
}

impl CandidateEvent {
    /// Submission payload once venue and organizer have been resolved
    pub fn to_input(&self, venue: &NormalizedRef, organizer: &NormalizedRef) -> EventInput {
        EventInput {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            category: Some(self.category.clone()),
            date_time: DateRange {
                start: Some(self.start),
                end: None,
            },
            location: Location {
                venue_name: Some(venue.name.clone()),
                venue_id: Some(venue.id),
                ..Location::default()
            },
            pricing: None,
            organizer: Some(organizer.id),
            slug: Some(self.slug.clone()),
        }
    }
}

struct CompiledSelectors {
    event: Selector,
    title: Selector,
    description: Selector,
    category: Selector,
    date: Selector,
    venue: Selector,
    organizer: Selector,
}

impl CompiledSelectors {
    fn compile(selectors: &Selectors) -> Result<Self> {
        Ok(Self {
            event: compile(&selectors.event)?,
            title: compile(&selectors.title)?,
            description: compile(&selectors.description)?,
            category: compile(&selectors.category)?,
            date: compile(&selectors.date)?,
            venue: compile(&selectors.venue)?,
            organizer: compile(&selectors.organizer)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// A parsed listing page
pub struct EventListing {
    document: Html,
    selectors: CompiledSelectors,
}

impl EventListing {
    /// Parse with the default selectors
    pub fn parse(html: &str) -> Result<Self> {
        Self::parse_with(html, &Selectors::default())
    }

    pub fn parse_with(html: &str, selectors: &Selectors) -> Result<Self> {
        Ok(Self {
            document: Html::parse_document(html),
            selectors: CompiledSelectors::compile(selectors)?,
        })
    }

    /// Candidates in document order
    ///
    /// Lazy and finite; call again to start over.
    pub fn candidates(&self) -> impl Iterator<Item = CandidateEvent> + '_ {
        self.document
            .select(&self.selectors.event)
            .enumerate()
            .filter_map(move |(index, element)| match self.candidate_from(element) {
                Ok(candidate) => Some(candidate),
                Err(reason) => {
                    tracing::warn!(index, "Skipping event element: {}", reason);
                    None
                }
            })
    }

    fn candidate_from(&self, element: ElementRef<'_>) -> std::result::Result<CandidateEvent, String> {
        let s = &self.selectors;
        let title = field_text(element, &s.title).ok_or("missing title")?;
        let category = field_text(element, &s.category).ok_or("missing category")?;
        let venue_name = field_text(element, &s.venue).ok_or("missing venue")?;
        let organizer_name = field_text(element, &s.organizer).ok_or("missing organizer")?;
        let raw_date = field_text(element, &s.date).ok_or("missing date")?;
        let start = time::parse_flexible(&raw_date).ok_or_else(|| format!("unparseable date {:?}", raw_date))?;

        let slug = slugify(&title);
        if slug.is_empty() {
            return Err(format!("title {:?} yields an empty slug", title));
        }

        Ok(CandidateEvent {
            description: field_text(element, &s.description),
            title,
            category,
            start,
            venue_name,
            organizer_name,
            slug,
        })
    }
}

/// Trimmed, whitespace-collapsed text of the first match, `None` if blank
fn field_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let node = element.select(selector).next()?;
    let text = node.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}
