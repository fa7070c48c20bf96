//! Write-path services sitting between the HTTP handlers and the store

pub mod event_upsert;
pub mod normalization;

pub use event_upsert::{upsert_event, UpsertOutcome};
pub use normalization::normalize;
