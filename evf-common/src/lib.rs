//! # Eventfinder Common Library
//!
//! Shared code for the Eventfinder server and scraper:
//! - Record types and allow-listed write payloads
//! - Slug derivation
//! - Error taxonomy
//! - Date parsing
//! - Configuration and logging setup

pub mod config;
pub mod error;
pub mod models;
pub mod slug;
pub mod time;

pub use error::{Error, Result};
pub use slug::slugify;
