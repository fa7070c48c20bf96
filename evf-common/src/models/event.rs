//! Event document and write payload

use super::{clean, require, GeoPoint, Organizer, Venue};
use crate::slug::{normalize_slug, slugify};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Start/end timestamps; either may be absent independently
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

/// Free-text address carried on the event itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Where the event happens
///
/// `venue_name` is a denormalised copy of the venue's name so listings can be
/// searched without a join.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<EventAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
    #[serde(default)]
    pub accessibility: Map<String, Value>,
    #[serde(default)]
    pub transport: Map<String, Value>,
    #[serde(default)]
    pub geocoding: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Pricing {
    #[serde(default)]
    pub is_free: bool,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

fn default_currency() -> String {
    "NZD".to_string()
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            is_free: false,
            currency: default_currency(),
            min_price: None,
            max_price: None,
        }
    }
}

/// Stored event document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub date_time: DateRange,
    #[serde(default)]
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<Uuid>,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `GET /api/events/:id` response: the event with its references resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<Venue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer_details: Option<Organizer>,
}

/// Compact event entry used in venue/organizer back-reference lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
}

/// Allow-listed event write payload
///
/// Server-managed fields (`_id`, timestamps) are not accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EventInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub date_time: DateRange,
    #[serde(default)]
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// How a write obtains its slug
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugPolicy {
    /// Upsert path: the slug is the lookup key and must be supplied
    Required,
    /// Replace-by-id path: fall back to deriving from the title
    DeriveFromTitle,
}

/// Validated event fields, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub date_time: DateRange,
    pub location: Location,
    pub pricing: Option<Pricing>,
    pub organizer: Option<Uuid>,
    pub slug: String,
}

impl EventInput {
    /// Validate and normalise into a writable record
    pub fn into_record(self, policy: SlugPolicy) -> Result<EventRecord> {
        let supplied_slug = normalize_slug(self.slug.as_deref());
        if policy == SlugPolicy::Required && supplied_slug.is_none() {
            return Err(Error::validation("slug is required"));
        }

        let title = require(self.title, "title")?;
        let category = require(self.category, "category")?;

        let slug = match supplied_slug {
            Some(slug) => slug,
            None => {
                let derived = slugify(&title);
                if derived.is_empty() {
                    return Err(Error::validation("slug could not be derived from title"));
                }
                derived
            }
        };

        if let (Some(start), Some(end)) = (self.date_time.start, self.date_time.end) {
            if end < start {
                return Err(Error::validation("dateTime.end is before dateTime.start"));
            }
        }

        let mut location = self.location;
        location.venue_name = clean(location.venue_name);
        if let Some(point) = &location.coordinates {
            point.validate()?;
        }
        location.address = location.address.and_then(|address| {
            let address = EventAddress {
                suburb: clean(address.suburb),
                city: clean(address.city),
            };
            (address != EventAddress::default()).then_some(address)
        });

        if let Some(pricing) = &self.pricing {
            validate_pricing(pricing)?;
        }

        Ok(EventRecord {
            title,
            description: clean(self.description),
            category,
            date_time: self.date_time,
            location,
            pricing: self.pricing,
            organizer: self.organizer,
            slug,
        })
    }
}

fn validate_pricing(pricing: &Pricing) -> Result<()> {
    let negative = |p: Option<f64>| p.is_some_and(|v| v < 0.0);
    if negative(pricing.min_price) || negative(pricing.max_price) {
        return Err(Error::validation("prices cannot be negative"));
    }
    if let (Some(min), Some(max)) = (pricing.min_price, pricing.max_price) {
        if min > max {
            return Err(Error::validation("pricing.minPrice exceeds pricing.maxPrice"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jazz_night() -> EventInput {
        serde_json::from_value(serde_json::json!({
            "slug": "jazz-night",
            "title": "Jazz Night",
            "category": "Music",
            "dateTime": {"start": "2025-06-01T20:00:00Z"}
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_input_becomes_record() {
        let record = jazz_night().into_record(SlugPolicy::Required).unwrap();
        assert_eq!(record.slug, "jazz-night");
        assert_eq!(record.title, "Jazz Night");
        assert!(record.date_time.start.is_some());
        assert!(record.date_time.end.is_none());
    }

    #[test]
    fn test_missing_slug_rejected_when_required() {
        let mut input = jazz_night();
        input.slug = None;
        let err = input.into_record(SlugPolicy::Required).unwrap_err();
        assert_eq!(err.to_string(), "slug is required");
    }

    #[test]
    fn test_missing_slug_derived_for_replace() {
        let mut input = jazz_night();
        input.slug = None;
        input.title = Some("Jazz Night: Extended!".to_string());
        let record = input.into_record(SlugPolicy::DeriveFromTitle).unwrap();
        assert_eq!(record.slug, "jazz-night-extended");
    }

    #[test]
    fn test_supplied_slug_is_normalised() {
        let mut input = jazz_night();
        input.slug = Some("Jazz Night".to_string());
        let record = input.into_record(SlugPolicy::Required).unwrap();
        assert_eq!(record.slug, "jazz-night");
    }

    #[test]
    fn test_blank_title_and_category_rejected() {
        let mut input = jazz_night();
        input.title = Some("   ".to_string());
        let err = input.into_record(SlugPolicy::Required).unwrap_err();
        assert_eq!(err.to_string(), "title is required");

        let mut input = jazz_night();
        input.category = None;
        let err = input.into_record(SlugPolicy::Required).unwrap_err();
        assert_eq!(err.to_string(), "category is required");
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: std::result::Result<EventInput, _> = serde_json::from_value(serde_json::json!({
            "slug": "x",
            "title": "X",
            "category": "Music",
            "isAdmin": true
        }));
        assert!(result.is_err());

        let result: std::result::Result<EventInput, _> = serde_json::from_value(serde_json::json!({
            "_id": "00000000-0000-0000-0000-000000000000",
            "slug": "x"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut input = jazz_night();
        input.date_time.end = Some("2025-06-01T19:00:00Z".parse().unwrap());
        assert!(input.into_record(SlugPolicy::Required).is_err());
    }

    #[test]
    fn test_pricing_defaults_and_bounds() {
        let pricing: Pricing = serde_json::from_str(r#"{"minPrice": 10}"#).unwrap();
        assert_eq!(pricing.currency, "NZD");
        assert!(!pricing.is_free);

        let mut input = jazz_night();
        input.pricing = Some(Pricing {
            min_price: Some(30.0),
            max_price: Some(20.0),
            ..Pricing::default()
        });
        assert!(input.into_record(SlugPolicy::Required).is_err());
    }

    #[test]
    fn test_event_serialises_with_wire_names() {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            title: "Jazz Night".to_string(),
            description: None,
            category: "Music".to_string(),
            date_time: DateRange::default(),
            location: Location {
                venue_name: Some("The Hall".to_string()),
                ..Location::default()
            },
            pricing: None,
            organizer: None,
            slug: "jazz-night".to_string(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("_id").is_some());
        assert!(json.get("dateTime").is_some());
        assert_eq!(json["location"]["venueName"], "The Hall");
        assert!(json.get("description").is_none());
        assert!(json.get("createdAt").is_some());
    }
}
