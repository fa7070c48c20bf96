//! Venue document and write payload

use super::{clean, require, Contact, EventSummary, GeoPoint};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VenueAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    /// Required for directly created venues (used for geocoding)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "New Zealand".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Accessibility {
    #[serde(default)]
    pub wheelchair_access: bool,
    #[serde(default)]
    pub parking: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Transport {
    /// e.g. "Bus Routes: 1, 5, 12"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_info: Option<String>,
}

/// Stored venue document
///
/// Venues created through name normalization are stubs: everything but
/// `name` is absent until a later full update enriches them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<VenueAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<Accessibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
    /// Derived on read from the events table; never stored
    #[serde(default)]
    pub events: Vec<EventSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Allow-listed venue write payload (create and full replace)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VenueInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub contact: Option<Contact>,
    #[serde(default)]
    pub address: Option<VenueAddress>,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
    #[serde(default)]
    pub accessibility: Option<Accessibility>,
    #[serde(default)]
    pub transport: Option<Transport>,
}

/// Validated venue fields
#[derive(Debug, Clone, PartialEq)]
pub struct VenueRecord {
    pub name: String,
    pub website: Option<String>,
    pub contact: Option<Contact>,
    pub address: VenueAddress,
    pub coordinates: GeoPoint,
    pub accessibility: Option<Accessibility>,
    pub transport: Option<Transport>,
}

impl VenueInput {
    pub fn into_record(self) -> Result<VenueRecord> {
        let name = require(self.name, "name")?;

        let address = self
            .address
            .ok_or_else(|| Error::validation("City is required for venue geocoding."))?;
        let address = VenueAddress {
            street: clean(address.street),
            suburb: clean(address.suburb),
            city: Some(require(address.city, "address.city")?),
            postcode: clean(address.postcode),
            country: clean(Some(address.country)).unwrap_or_else(default_country),
        };

        let coordinates = self
            .coordinates
            .ok_or_else(|| Error::validation("Coordinates [lon, lat] are required."))?;
        coordinates.validate()?;

        let accessibility = self.accessibility.map(|a| Accessibility {
            notes: clean(a.notes),
            ..a
        });
        let transport = self.transport.and_then(|t| {
            let t = Transport {
                public: clean(t.public),
                parking_info: clean(t.parking_info),
            };
            (t != Transport::default()).then_some(t)
        });

        Ok(VenueRecord {
            name,
            website: clean(self.website),
            contact: self.contact.and_then(Contact::cleaned),
            address,
            coordinates,
            accessibility,
            transport,
        })
    }
}
