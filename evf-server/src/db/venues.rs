//! Venue persistence
//!
//! The `events` list on a venue is not stored; it is rebuilt from
//! `events.venue_id` on every read so it cannot drift.

use super::events::{self, EventRef};
use super::parse_id;
use evf_common::time;
use evf_common::models::{Accessibility, Contact, GeoPoint, Transport, Venue, VenueAddress, VenueRecord};
use evf_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const VENUE_COLUMNS: &str =
    "id, name, website, contact, address, coordinates, accessibility, transport, created_at, updated_at";

pub async fn create(pool: &SqlitePool, record: &VenueRecord) -> Result<Venue> {
    let now = time::now();
    let sql = format!(
        r#"
        INSERT INTO venues (
            id, name, website, contact, address, coordinates, accessibility, transport,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        VENUE_COLUMNS
    );

    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4().to_string())
        .bind(&record.name)
        .bind(&record.website)
        .bind(record.contact.as_ref().map(Json))
        .bind(Json(&record.address))
        .bind(Json(&record.coordinates))
        .bind(record.accessibility.as_ref().map(Json))
        .bind(record.transport.as_ref().map(Json))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

    // A brand-new venue has no events yet
    venue_from_row(&row)
}

/// Full replace; `None` when the id is unknown
pub async fn replace(pool: &SqlitePool, id: Uuid, record: &VenueRecord) -> Result<Option<Venue>> {
    let sql = format!(
        r#"
        UPDATE venues SET
            name = ?, website = ?, contact = ?, address = ?, coordinates = ?,
            accessibility = ?, transport = ?, updated_at = ?
        WHERE id = ?
        RETURNING {}
        "#,
        VENUE_COLUMNS
    );

    let row = sqlx::query(&sql)
        .bind(&record.name)
        .bind(&record.website)
        .bind(record.contact.as_ref().map(Json))
        .bind(Json(&record.address))
        .bind(Json(&record.coordinates))
        .bind(record.accessibility.as_ref().map(Json))
        .bind(record.transport.as_ref().map(Json))
        .bind(time::now())
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    with_events(pool, row).await
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Venue>> {
    let row = sqlx::query(&format!("SELECT {} FROM venues WHERE id = ?", VENUE_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    with_events(pool, row).await
}

/// All venues by name, each with its event list
pub async fn list(pool: &SqlitePool) -> Result<Vec<Venue>> {
    let rows = sqlx::query(&format!("SELECT {} FROM venues ORDER BY name ASC", VENUE_COLUMNS))
        .fetch_all(pool)
        .await?;

    let mut by_venue = events::summaries_grouped(pool, EventRef::Venue).await?;
    rows.iter()
        .map(|row| {
            let mut venue = venue_from_row(row)?;
            venue.events = by_venue.remove(&venue.id).unwrap_or_default();
            Ok(venue)
        })
        .collect()
}

/// Delete by id; referencing events have their venue reference cleared
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM venues WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

async fn with_events(pool: &SqlitePool, row: Option<SqliteRow>) -> Result<Option<Venue>> {
    let Some(row) = row else {
        return Ok(None);
    };
    let mut venue = venue_from_row(&row)?;
    venue.events = events::summaries_for(pool, EventRef::Venue, venue.id).await?;
    Ok(Some(venue))
}

fn venue_from_row(row: &SqliteRow) -> Result<Venue> {
    let id: String = row.try_get("id")?;
    let contact: Option<Json<Contact>> = row.try_get("contact")?;
    let address: Option<Json<VenueAddress>> = row.try_get("address")?;
    let coordinates: Option<Json<GeoPoint>> = row.try_get("coordinates")?;
    let accessibility: Option<Json<Accessibility>> = row.try_get("accessibility")?;
    let transport: Option<Json<Transport>> = row.try_get("transport")?;

    Ok(Venue {
        id: parse_id(&id)?,
        name: row.try_get("name")?,
        website: row.try_get("website")?,
        contact: contact.map(|Json(c)| c),
        address: address.map(|Json(a)| a),
        coordinates: coordinates.map(|Json(c)| c),
        accessibility: accessibility.map(|Json(a)| a),
        transport: transport.map(|Json(t)| t),
        events: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_memory_pool, normalize};
    use evf_common::models::{EventInput, RecordKind, SlugPolicy, VenueInput};

    fn town_hall() -> VenueRecord {
        let input: VenueInput = serde_json::from_value(serde_json::json!({
            "name": "Town Hall",
            "address": {"city": "Auckland"},
            "coordinates": {"coordinates": [174.764, -36.852]}
        }))
        .unwrap();
        input.into_record().unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = init_memory_pool().await.unwrap();
        let created = create(&pool, &town_hall()).await.unwrap();

        let found = find_by_id(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Town Hall");
        assert_eq!(found.address.unwrap().country, "New Zealand");
        assert!(found.events.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let pool = init_memory_pool().await.unwrap();
        create(&pool, &town_hall()).await.unwrap();

        let err = create(&pool, &town_hall()).await.unwrap_err();
        assert!(matches!(err, evf_common::Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_replace_enriches_stub() {
        let pool = init_memory_pool().await.unwrap();
        let stub = normalize::find_or_create(&pool, RecordKind::Venue, "Town Hall").await.unwrap();

        let stored = find_by_id(&pool, stub.id).await.unwrap().unwrap();
        assert!(stored.address.is_none());

        let enriched = replace(&pool, stub.id, &town_hall()).await.unwrap().unwrap();
        assert_eq!(enriched.id, stub.id);
        assert!(enriched.coordinates.is_some());
    }

    #[tokio::test]
    async fn test_events_derived_and_cleared_on_delete() {
        let pool = init_memory_pool().await.unwrap();
        let venue = create(&pool, &town_hall()).await.unwrap();

        let mut input: EventInput = serde_json::from_value(serde_json::json!({
            "slug": "jazz-night",
            "title": "Jazz Night",
            "category": "Music",
            "dateTime": {"start": "2025-06-01T20:00:00Z"}
        }))
        .unwrap();
        input.location.venue_id = Some(venue.id);
        input.location.venue_name = Some("Town Hall".to_string());
        let (event, _) = events::upsert_by_slug(&pool, &input.into_record(SlugPolicy::Required).unwrap())
            .await
            .unwrap();

        let found = find_by_id(&pool, venue.id).await.unwrap().unwrap();
        assert_eq!(found.events.len(), 1);
        let replaced = replace(&pool, venue.id, &town_hall()).await.unwrap().unwrap();
        assert_eq!(replaced.events.len(), 1);
        assert_eq!(replaced.events[0].id, event.id);

        let listed = list(&pool).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].events.len(), 1);
        assert_eq!(listed[0].events[0].slug, "jazz-night");

        assert!(delete(&pool, venue.id).await.unwrap());
        let orphan = events::find_by_id(&pool, event.id).await.unwrap().unwrap();
        assert!(orphan.location.venue_id.is_none());
        assert_eq!(orphan.location.venue_name.as_deref(), Some("Town Hall"));
    }
}
