//! Event persistence
//!
//! The slug upsert is a single `INSERT … ON CONFLICT(slug) DO UPDATE …
//! RETURNING` statement: concurrent writers targeting the same slug cannot
//! interleave an existence check with a write, and the unique index is what
//! guarantees one document per slug.

use super::parse_id;
use chrono::{DateTime, Utc};
use evf_common::models::{DateRange, Event, EventRecord, EventSummary, Location, Pricing};
use evf_common::{time, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

const EVENT_COLUMNS: &str = "id, slug, title, description, category, start_at, end_at, \
     venue_id, venue_name, location, pricing, organizer_id, created_at, updated_at";

/// Filters for `GET /api/events`
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Inclusive lower bound on start time
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on start time
    pub to: Option<DateTime<Utc>>,
    /// Case-insensitive substring of title, description, venue name or category
    pub search: Option<String>,
    /// Exact, case-sensitive category
    pub category: Option<String>,
}

/// Which reference column a back-reference list is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRef {
    Venue,
    Organizer,
}

impl EventRef {
    fn column(&self) -> &'static str {
        match self {
            EventRef::Venue => "venue_id",
            EventRef::Organizer => "organizer_id",
        }
    }
}

/// Insert or fully replace the event keyed by `record.slug`
///
/// Returns the stored document and whether this call inserted it. The insert
/// carries a freshly generated id; a conflicting row keeps its own id, so the
/// returned id tells the two outcomes apart without comparing timestamps.
pub async fn upsert_by_slug(pool: &SqlitePool, record: &EventRecord) -> Result<(Event, bool)> {
    let candidate_id = Uuid::new_v4();
    let now = time::now();

    let sql = format!(
        r#"
        INSERT INTO events (
            id, slug, title, description, category, start_at, end_at,
            venue_id, venue_name, location, pricing, organizer_id, search_text,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(slug) DO UPDATE SET
            title = excluded.title,
            description = excluded.description,
            category = excluded.category,
            start_at = excluded.start_at,
            end_at = excluded.end_at,
            venue_id = excluded.venue_id,
            venue_name = excluded.venue_name,
            location = excluded.location,
            pricing = excluded.pricing,
            organizer_id = excluded.organizer_id,
            search_text = excluded.search_text,
            updated_at = excluded.updated_at
        RETURNING {}
        "#,
        EVENT_COLUMNS
    );

    let row = sqlx::query(&sql)
        .bind(candidate_id.to_string())
        .bind(&record.slug)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.category)
        .bind(record.date_time.start)
        .bind(record.date_time.end)
        .bind(record.location.venue_id.map(|id| id.to_string()))
        .bind(&record.location.venue_name)
        .bind(Json(&record.location))
        .bind(record.pricing.as_ref().map(Json))
        .bind(record.organizer.map(|id| id.to_string()))
        .bind(search_text(record))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

    let event = event_from_row(&row)?;
    let is_new = event.id == candidate_id;
    Ok((event, is_new))
}

/// Replace every mutable field of the event with the given id
///
/// Returns `None` when no such event exists.
pub async fn replace(pool: &SqlitePool, id: Uuid, record: &EventRecord) -> Result<Option<Event>> {
    let sql = format!(
        r#"
        UPDATE events SET
            slug = ?, title = ?, description = ?, category = ?, start_at = ?, end_at = ?,
            venue_id = ?, venue_name = ?, location = ?, pricing = ?, organizer_id = ?,
            search_text = ?, updated_at = ?
        WHERE id = ?
        RETURNING {}
        "#,
        EVENT_COLUMNS
    );

    let row = sqlx::query(&sql)
        .bind(&record.slug)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.category)
        .bind(record.date_time.start)
        .bind(record.date_time.end)
        .bind(record.location.venue_id.map(|id| id.to_string()))
        .bind(&record.location.venue_name)
        .bind(Json(&record.location))
        .bind(record.pricing.as_ref().map(Json))
        .bind(record.organizer.map(|id| id.to_string()))
        .bind(search_text(record))
        .bind(time::now())
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(event_from_row).transpose()
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Event>> {
    let row = sqlx::query(&format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(event_from_row).transpose()
}

/// List events matching `filter`, earliest start first
///
/// With neither bound given, only events that have a start time are listed.
pub async fn list(pool: &SqlitePool, filter: &EventFilter) -> Result<Vec<Event>> {
    let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM events WHERE 1 = 1", EVENT_COLUMNS));

    if filter.from.is_none() && filter.to.is_none() {
        query.push(" AND start_at IS NOT NULL");
    }
    if let Some(from) = filter.from {
        query.push(" AND start_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        query.push(" AND start_at <= ").push_bind(to);
    }
    if let Some(category) = &filter.category {
        query.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(search) = &filter.search {
        // SQLite only folds ASCII case, so both sides are lowercased in Rust
        query
            .push(" AND instr(search_text, ")
            .push_bind(search.to_lowercase())
            .push(") > 0");
    }
    query.push(" ORDER BY start_at ASC, created_at ASC");

    let rows = query.build().fetch_all(pool).await?;
    rows.iter().map(event_from_row).collect()
}

/// Delete by id; `false` when nothing was deleted
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(pool)
        .await?)
}

/// Back-reference list for one venue or organizer
pub async fn summaries_for(pool: &SqlitePool, by: EventRef, id: Uuid) -> Result<Vec<EventSummary>> {
    let sql = format!(
        "SELECT id, title, slug, start_at FROM events WHERE {} = ? ORDER BY start_at ASC",
        by.column()
    );
    let rows = sqlx::query(&sql).bind(id.to_string()).fetch_all(pool).await?;
    rows.iter().map(summary_from_row).collect()
}

/// Back-reference lists for every referenced venue or organizer at once
pub async fn summaries_grouped(
    pool: &SqlitePool,
    by: EventRef,
) -> Result<HashMap<Uuid, Vec<EventSummary>>> {
    let sql = format!(
        "SELECT id, title, slug, start_at, {col} AS owner FROM events \
         WHERE {col} IS NOT NULL ORDER BY start_at ASC",
        col = by.column()
    );
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    let mut grouped: HashMap<Uuid, Vec<EventSummary>> = HashMap::new();
    for row in &rows {
        let owner: String = row.try_get("owner")?;
        grouped
            .entry(parse_id(&owner)?)
            .or_default()
            .push(summary_from_row(row)?);
    }
    Ok(grouped)
}

/// Lowercased title, description, venue name and category
fn search_text(record: &EventRecord) -> String {
    [
        Some(record.title.as_str()),
        record.description.as_deref(),
        record.location.venue_name.as_deref(),
        Some(record.category.as_str()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n")
    .to_lowercase()
}

fn summary_from_row(row: &SqliteRow) -> Result<EventSummary> {
    let id: String = row.try_get("id")?;
    Ok(EventSummary {
        id: parse_id(&id)?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        start: row.try_get("start_at")?,
    })
}

fn event_from_row(row: &SqliteRow) -> Result<Event> {
    let id: String = row.try_get("id")?;
    let venue_id: Option<String> = row.try_get("venue_id")?;
    let organizer_id: Option<String> = row.try_get("organizer_id")?;
    let Json(mut location): Json<Location> = row.try_get("location")?;
    let pricing: Option<Json<Pricing>> = row.try_get("pricing")?;

    // Columns win over the JSON copy (ON DELETE SET NULL only clears columns)
    location.venue_id = venue_id.as_deref().map(parse_id).transpose()?;
    location.venue_name = row.try_get("venue_name")?;

    Ok(Event {
        id: parse_id(&id)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        date_time: DateRange {
            start: row.try_get("start_at")?,
            end: row.try_get("end_at")?,
        },
        location,
        pricing: pricing.map(|Json(p)| p),
        organizer: organizer_id.as_deref().map(parse_id).transpose()?,
        slug: row.try_get("slug")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_pool;
    use evf_common::models::{EventInput, SlugPolicy};

    fn record(slug: &str, title: &str, category: &str, start: Option<&str>) -> EventRecord {
        EventInput {
            slug: Some(slug.to_string()),
            title: Some(title.to_string()),
            category: Some(category.to_string()),
            date_time: DateRange {
                start: start.map(|s| s.parse().unwrap()),
                end: None,
            },
            ..EventInput::default()
        }
        .into_record(SlugPolicy::Required)
        .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_replaces() {
        let pool = init_memory_pool().await.unwrap();

        let first = record("jazz-night", "Jazz Night", "Music", Some("2025-06-01T20:00:00Z"));
        let (created, is_new) = upsert_by_slug(&pool, &first).await.unwrap();
        assert!(is_new);
        assert_eq!(created.title, "Jazz Night");

        let mut second = record("jazz-night", "Jazz Night Extended", "Music", None);
        second.description = Some("Now with a second set".to_string());
        let (updated, is_new) = upsert_by_slug(&pool, &second).await.unwrap();
        assert!(!is_new);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Jazz Night Extended");
        // Full replace: the start time from the first write is gone
        assert!(updated.date_time.start.is_none());
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_identical_replay_reports_not_new() {
        let pool = init_memory_pool().await.unwrap();
        let candidate = record("quiz", "Quiz", "Pub", Some("2025-06-02T19:00:00Z"));

        let (_, first) = upsert_by_slug(&pool, &candidate).await.unwrap();
        let (_, second) = upsert_by_slug(&pool, &candidate).await.unwrap();
        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn test_list_defaults_to_events_with_start() {
        let pool = init_memory_pool().await.unwrap();
        upsert_by_slug(&pool, &record("a", "A", "Music", Some("2025-06-03T10:00:00Z"))).await.unwrap();
        upsert_by_slug(&pool, &record("b", "B", "Music", None)).await.unwrap();
        upsert_by_slug(&pool, &record("c", "C", "Music", Some("2025-06-01T10:00:00Z"))).await.unwrap();

        let events = list(&pool, &EventFilter::default()).await.unwrap();
        let slugs: Vec<_> = events.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_list_date_range_and_category() {
        let pool = init_memory_pool().await.unwrap();
        upsert_by_slug(&pool, &record("early", "Early", "Music", Some("2025-05-01T10:00:00Z"))).await.unwrap();
        upsert_by_slug(&pool, &record("mid", "Mid", "Music", Some("2025-06-15T10:00:00Z"))).await.unwrap();
        upsert_by_slug(&pool, &record("mid-art", "Mid Art", "Art", Some("2025-06-16T10:00:00Z"))).await.unwrap();
        upsert_by_slug(&pool, &record("late", "Late", "music", Some("2025-07-20T10:00:00Z"))).await.unwrap();

        let filter = EventFilter {
            from: Some("2025-06-01T00:00:00Z".parse().unwrap()),
            to: Some("2025-06-30T23:59:59Z".parse().unwrap()),
            ..EventFilter::default()
        };
        let slugs: Vec<_> = list(&pool, &filter).await.unwrap().into_iter().map(|e| e.slug).collect();
        assert_eq!(slugs, vec!["mid", "mid-art"]);

        let filter = EventFilter {
            category: Some("Music".to_string()),
            ..EventFilter::default()
        };
        let slugs: Vec<_> = list(&pool, &filter).await.unwrap().into_iter().map(|e| e.slug).collect();
        assert_eq!(slugs, vec!["early", "mid"]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_literal() {
        let pool = init_memory_pool().await.unwrap();
        let mut jazz = record("jazz", "Jazz Night", "Music", Some("2025-06-01T20:00:00Z"));
        jazz.location.venue_name = Some("Town Hall".to_string());
        upsert_by_slug(&pool, &jazz).await.unwrap();
        upsert_by_slug(&pool, &record("sale", "100% Off Sale", "Market", Some("2025-06-02T09:00:00Z")))
            .await
            .unwrap();

        let search = |s: &str| EventFilter {
            search: Some(s.to_string()),
            ..EventFilter::default()
        };

        let hits = list(&pool, &search("town hall")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug, "jazz");

        let hits = list(&pool, &search("JAZZ")).await.unwrap();
        assert_eq!(hits.len(), 1);

        // '%' is matched literally, not as a wildcard
        let hits = list(&pool, &search("0% o")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug, "sale");
        assert!(list(&pool, &search("%")).await.unwrap().len() == 1);
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let pool = init_memory_pool().await.unwrap();
        let mut cafe = record("cafe-elan", "Café Élan", "Food", Some("2025-06-05T18:00:00Z"));
        cafe.location.venue_name = Some("Ōtāhuhu Hall".to_string());
        let (event, _) = upsert_by_slug(&pool, &cafe).await.unwrap();

        let search = |s: &str| EventFilter {
            search: Some(s.to_string()),
            ..EventFilter::default()
        };
        for term in ["café", "CAFÉ", "élan", "ÉLAN", "ōtāhuhu", "ŌTĀHUHU"] {
            assert_eq!(list(&pool, &search(term)).await.unwrap().len(), 1, "search {:?}", term);
        }

        // Replacing by id rewrites the searchable text too
        let renamed = record("cafe-elan", "Crêperie Noël", "Food", Some("2025-06-05T18:00:00Z"));
        replace(&pool, event.id, &renamed).await.unwrap();
        assert!(list(&pool, &search("élan")).await.unwrap().is_empty());
        assert_eq!(list(&pool, &search("NOËL")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_and_delete_by_id() {
        let pool = init_memory_pool().await.unwrap();
        let (event, _) = upsert_by_slug(&pool, &record("x", "X", "Music", None)).await.unwrap();

        let replaced = replace(&pool, event.id, &record("y", "Y", "Art", None)).await.unwrap().unwrap();
        assert_eq!(replaced.slug, "y");
        assert_eq!(replaced.id, event.id);
        assert_eq!(count(&pool).await.unwrap(), 1);

        assert!(replace(&pool, Uuid::new_v4(), &record("z", "Z", "Art", None)).await.unwrap().is_none());

        assert!(delete(&pool, event.id).await.unwrap());
        assert!(!delete(&pool, event.id).await.unwrap());
        assert!(find_by_id(&pool, event.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_into_taken_slug_conflicts() {
        let pool = init_memory_pool().await.unwrap();
        upsert_by_slug(&pool, &record("taken", "Taken", "Music", None)).await.unwrap();
        let (other, _) = upsert_by_slug(&pool, &record("other", "Other", "Music", None)).await.unwrap();

        let err = replace(&pool, other.id, &record("taken", "Taken", "Music", None))
            .await
            .unwrap_err();
        assert!(matches!(err, evf_common::Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_dangling_venue_reference_rejected() {
        let pool = init_memory_pool().await.unwrap();
        let mut candidate = record("orphan", "Orphan", "Music", None);
        candidate.location.venue_id = Some(Uuid::new_v4());

        let err = upsert_by_slug(&pool, &candidate).await.unwrap_err();
        assert!(matches!(err, evf_common::Error::Validation(_)));
        assert_eq!(count(&pool).await.unwrap(), 0);
    }
}
