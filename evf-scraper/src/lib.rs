//! evf-scraper library interface
//!
//! Reads an event listing page, resolves each event's venue and organizer
//! through the Eventfinder API, and submits the events for upsert.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;

pub use client::{ApiClient, EventBackend, SaveStatus};
pub use error::{ClientError, ScrapeError};
pub use extract::{CandidateEvent, EventListing};
pub use pipeline::{run, RunSummary};
