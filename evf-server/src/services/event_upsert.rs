//! Event upsert keyed by slug
//!
//! Re-submitting the same event (same slug) replaces the stored document
//! instead of duplicating it. Every mutable field takes the submitted value;
//! omitted optional fields become absent. `_id` and `createdAt` survive.

use crate::db::events;
use evf_common::models::{Event, EventInput, SlugPolicy};
use evf_common::Result;
use sqlx::SqlitePool;

/// Stored event plus whether this call created it
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub event: Event,
    pub is_new: bool,
}

pub async fn upsert_event(pool: &SqlitePool, input: EventInput) -> Result<UpsertOutcome> {
    let record = input.into_record(SlugPolicy::Required)?;
    let (event, is_new) = events::upsert_by_slug(pool, &record).await?;

    if is_new {
        tracing::info!(slug = %event.slug, id = %event.id, "Created event");
    } else {
        tracing::info!(slug = %event.slug, id = %event.id, "Updated event");
    }

    Ok(UpsertOutcome { event, is_new })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_pool;
    use evf_common::Error;

    fn input(value: serde_json::Value) -> EventInput {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_missing_slug_writes_nothing() {
        let pool = init_memory_pool().await.unwrap();
        let err = upsert_event(&pool, input(serde_json::json!({"title": "X", "category": "Music"})))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(events::count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_second_submission_replaces_first() {
        let pool = init_memory_pool().await.unwrap();

        let first = upsert_event(
            &pool,
            input(serde_json::json!({
                "slug": "jazz-night",
                "title": "Jazz Night",
                "category": "Music",
                "pricing": {"isFree": true}
            })),
        )
        .await
        .unwrap();
        assert!(first.is_new);

        let second = upsert_event(
            &pool,
            input(serde_json::json!({
                "slug": "jazz-night",
                "title": "Jazz Night (Late Show)",
                "category": "Music"
            })),
        )
        .await
        .unwrap();
        assert!(!second.is_new);
        assert_eq!(second.event.id, first.event.id);
        assert_eq!(second.event.title, "Jazz Night (Late Show)");
        assert!(second.event.pricing.is_none());
        assert!(second.event.updated_at >= first.event.updated_at);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_keep_one_document() {
        let pool = init_memory_pool().await.unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    upsert_event(
                        &pool,
                        input(serde_json::json!({
                            "slug": "race",
                            "title": format!("Race {}", i),
                            "category": "Sport"
                        })),
                    )
                    .await
                    .unwrap()
                })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            if task.await.unwrap().is_new {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(events::count(&pool).await.unwrap(), 1);
    }
}
