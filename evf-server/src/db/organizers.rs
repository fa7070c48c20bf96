//! Organizer persistence

use super::events::{self, EventRef};
use super::parse_id;
use evf_common::time;
use evf_common::models::{Contact, Organizer, OrganizerRecord, SocialMedia};
use evf_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const ORGANIZER_COLUMNS: &str = "id, name, website, contact, social_media, created_at, updated_at";

pub async fn create(pool: &SqlitePool, record: &OrganizerRecord) -> Result<Organizer> {
    let now = time::now();
    let sql = format!(
        "INSERT INTO organizers (id, name, website, contact, social_media, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {}",
        ORGANIZER_COLUMNS
    );

    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4().to_string())
        .bind(&record.name)
        .bind(&record.website)
        .bind(record.contact.as_ref().map(Json))
        .bind(record.social_media.as_ref().map(Json))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

    organizer_from_row(&row)
}

pub async fn replace(pool: &SqlitePool, id: Uuid, record: &OrganizerRecord) -> Result<Option<Organizer>> {
    let sql = format!(
        "UPDATE organizers SET name = ?, website = ?, contact = ?, social_media = ?, updated_at = ? \
         WHERE id = ? RETURNING {}",
        ORGANIZER_COLUMNS
    );

    let row = sqlx::query(&sql)
        .bind(&record.name)
        .bind(&record.website)
        .bind(record.contact.as_ref().map(Json))
        .bind(record.social_media.as_ref().map(Json))
        .bind(time::now())
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    with_events(pool, row).await
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Organizer>> {
    let row = sqlx::query(&format!("SELECT {} FROM organizers WHERE id = ?", ORGANIZER_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    with_events(pool, row).await
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<Organizer>> {
    let rows = sqlx::query(&format!("SELECT {} FROM organizers ORDER BY name ASC", ORGANIZER_COLUMNS))
        .fetch_all(pool)
        .await?;

    let mut by_organizer = events::summaries_grouped(pool, EventRef::Organizer).await?;
    rows.iter()
        .map(|row| {
            let mut organizer = organizer_from_row(row)?;
            organizer.events = by_organizer.remove(&organizer.id).unwrap_or_default();
            Ok(organizer)
        })
        .collect()
}

pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM organizers WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

async fn with_events(pool: &SqlitePool, row: Option<SqliteRow>) -> Result<Option<Organizer>> {
    let Some(row) = row else {
        return Ok(None);
    };
    let mut organizer = organizer_from_row(&row)?;
    organizer.events = events::summaries_for(pool, EventRef::Organizer, organizer.id).await?;
    Ok(Some(organizer))
}

fn organizer_from_row(row: &SqliteRow) -> Result<Organizer> {
    let id: String = row.try_get("id")?;
    let contact: Option<Json<Contact>> = row.try_get("contact")?;
    let social_media: Option<Json<SocialMedia>> = row.try_get("social_media")?;

    Ok(Organizer {
        id: parse_id(&id)?,
        name: row.try_get("name")?,
        website: row.try_get("website")?,
        contact: contact.map(|Json(c)| c),
        social_media: social_media.map(|Json(s)| s),
        events: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_pool;
    use evf_common::models::{EventInput, OrganizerInput, SlugPolicy};

    fn collective() -> OrganizerRecord {
        OrganizerInput {
            name: Some("Jazz Collective".to_string()),
            website: Some("https://jazz.example.nz".to_string()),
            ..OrganizerInput::default()
        }
        .into_record()
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_replace_delete() {
        let pool = init_memory_pool().await.unwrap();
        let created = create(&pool, &collective()).await.unwrap();
        assert_eq!(created.website.as_deref(), Some("https://jazz.example.nz"));

        let mut renamed = collective();
        renamed.name = "Auckland Jazz Collective".to_string();
        renamed.website = None;
        let replaced = replace(&pool, created.id, &renamed).await.unwrap().unwrap();
        assert_eq!(replaced.name, "Auckland Jazz Collective");
        assert!(replaced.website.is_none());

        assert!(delete(&pool, created.id).await.unwrap());
        assert!(find_by_id(&pool, created.id).await.unwrap().is_none());
        assert!(replace(&pool, created.id, &renamed).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_events_listed_per_organizer() {
        let pool = init_memory_pool().await.unwrap();
        let organizer = create(&pool, &collective()).await.unwrap();
        let other = create(
            &pool,
            &OrganizerRecord {
                name: "Quiz Masters".to_string(),
                website: None,
                contact: None,
                social_media: None,
            },
        )
        .await
        .unwrap();

        for slug in ["set-one", "set-two"] {
            let input = EventInput {
                slug: Some(slug.to_string()),
                title: Some(slug.to_string()),
                category: Some("Music".to_string()),
                organizer: Some(organizer.id),
                ..EventInput::default()
            };
            events::upsert_by_slug(&pool, &input.into_record(SlugPolicy::Required).unwrap())
                .await
                .unwrap();
        }

        let found = find_by_id(&pool, organizer.id).await.unwrap().unwrap();
        assert_eq!(found.events.len(), 2);

        let listed = list(&pool).await.unwrap();
        let quiz = listed.iter().find(|o| o.id == other.id).unwrap();
        assert!(quiz.events.is_empty());
    }
}
