//! Organizer (person, company or group) document and write payload

use super::{clean, require, Contact, EventSummary};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
}

/// Stored organizer document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_media: Option<SocialMedia>,
    /// Derived on read from the events table; never stored
    #[serde(default)]
    pub events: Vec<EventSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrganizerInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub contact: Option<Contact>,
    #[serde(default)]
    pub social_media: Option<SocialMedia>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrganizerRecord {
    pub name: String,
    pub website: Option<String>,
    pub contact: Option<Contact>,
    pub social_media: Option<SocialMedia>,
}

impl OrganizerInput {
    pub fn into_record(self) -> Result<OrganizerRecord> {
        let name = require(self.name, "name")?;

        let contact = match self.contact.and_then(Contact::cleaned) {
            Some(mut contact) => {
                contact.email = contact.email.map(|e| e.to_lowercase());
                if let Some(email) = &contact.email {
                    if !email.contains('@') {
                        return Err(Error::validation(format!("invalid contact email: {}", email)));
                    }
                }
                Some(contact)
            }
            None => None,
        };

        let social_media = self.social_media.and_then(|s| {
            let s = SocialMedia {
                facebook: clean(s.facebook),
                instagram: clean(s.instagram),
                twitter: clean(s.twitter),
            };
            (s != SocialMedia::default()).then_some(s)
        });

        Ok(OrganizerRecord {
            name,
            website: clean(self.website),
            contact,
            social_media,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_lowercased() {
        let input: OrganizerInput = serde_json::from_value(serde_json::json!({
            "name": "Jazz Collective",
            "contact": {"email": "  Hello@JazzCollective.NZ "}
        }))
        .unwrap();
        let record = input.into_record().unwrap();
        assert_eq!(
            record.contact.unwrap().email.as_deref(),
            Some("hello@jazzcollective.nz")
        );
    }

    #[test]
    fn test_name_required() {
        let err = OrganizerInput::default().into_record().unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn test_blank_social_media_dropped() {
        let input: OrganizerInput = serde_json::from_value(serde_json::json!({
            "name": "Jazz Collective",
            "socialMedia": {"facebook": "  "}
        }))
        .unwrap();
        assert!(input.into_record().unwrap().social_media.is_none());
    }

    #[test]
    fn test_malformed_email_rejected() {
        let input: OrganizerInput = serde_json::from_value(serde_json::json!({
            "name": "Jazz Collective",
            "contact": {"email": "not-an-email"}
        }))
        .unwrap();
        assert!(input.into_record().is_err());
    }
}
