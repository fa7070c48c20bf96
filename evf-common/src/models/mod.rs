//! Record types shared by the server and the scraper
//!
//! Each record kind has two shapes:
//! - the stored document (`Event`, `Venue`, `Organizer`), serialised on reads
//! - an allow-listed write payload (`EventInput`, ...) that rejects unknown
//!   fields and is validated into a record before it reaches the store

pub mod event;
pub mod organizer;
pub mod venue;

pub use event::*;
pub use organizer::*;
pub use venue::*;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record kinds that can be resolved from a bare name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Venue,
    Organizer,
}

impl RecordKind {
    /// Human-readable label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Venue => "Venue",
            RecordKind::Organizer => "Organizer",
        }
    }

    /// REST collection segment, e.g. `venues` in `/api/venues/normalize`
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::Venue => "venues",
            RecordKind::Organizer => "organizers",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Body of `POST /api/{venues,organizers}/normalize`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizeRequest {
    pub name: String,
}

/// Result of name normalization: the stable identifier and the stored name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRef {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

/// GeoJSON point, `[longitude, latitude]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoPoint {
    #[serde(rename = "type", default = "point_type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

fn point_type() -> String {
    "Point".to_string()
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: point_type(),
            coordinates: vec![longitude, latitude],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.kind != "Point" {
            return Err(Error::validation(format!(
                "coordinates.type must be \"Point\", got \"{}\"",
                self.kind
            )));
        }
        match self.coordinates.as_slice() {
            [lon, lat] if (-180.0..=180.0).contains(lon) && (-90.0..=90.0).contains(lat) => Ok(()),
            [_, _] => Err(Error::validation("coordinates out of range [lon, lat]")),
            _ => Err(Error::validation("coordinates must be [lon, lat]")),
        }
    }
}

/// Phone/email contact block shared by venues and organizers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Contact {
    fn cleaned(self) -> Option<Self> {
        let contact = Contact {
            phone: clean(self.phone),
            email: clean(self.email),
        };
        (contact != Contact::default()).then_some(contact)
    }
}

/// Trim a free-text field, mapping blank to `None`
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim a required field, failing with `"<field> is required"` when blank
pub fn require(value: Option<String>, field: &str) -> Result<String> {
    clean(value).ok_or_else(|| Error::validation(format!("{} is required", field)))
}
