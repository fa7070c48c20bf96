//! Document store for evf-server
//!
//! Events, venues and organizers live in one SQLite database. Nested
//! sub-documents are JSON columns; every field the API filters or joins on
//! is a real column. The pool handle is created once in `main` and injected
//! through `AppState`; nothing reaches for a global connection.

pub mod events;
pub mod normalize;
pub mod organizers;
pub mod venues;

use evf_common::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use uuid::Uuid;

/// Connect to the store named by `database_url` and create tables if needed
///
/// Accepts any sqlx SQLite URL, e.g. `sqlite://eventfinder.db` or
/// `sqlite::memory:`. The file is created if missing.
pub async fn init_database_pool(database_url: &str) -> Result<SqlitePool> {
    if !database_url.starts_with("sqlite:") {
        return Err(Error::Config(format!(
            "Unsupported database URL {} (expected sqlite:...)",
            database_url
        )));
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| Error::Config(format!("Invalid database URL {}: {}", database_url, e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    tracing::debug!("Connecting to database: {}", database_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory store
///
/// An in-memory SQLite database is private to its connection, so the pool is
/// pinned to exactly one connection that is never recycled.
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the three collections and their indexes (idempotent)
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS venues (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            website TEXT,
            contact TEXT,
            address TEXT,
            coordinates TEXT,
            accessibility TEXT,
            transport TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS organizers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            website TEXT,
            contact TEXT,
            social_media TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // venue_id / venue_name are authoritative over the copies inside the
    // location JSON; ON DELETE SET NULL only touches the columns.
    // search_text is the Unicode-lowercased text the search filter matches.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL,
            start_at TEXT,
            end_at TEXT,
            venue_id TEXT REFERENCES venues(id) ON DELETE SET NULL,
            venue_name TEXT,
            location TEXT NOT NULL,
            pricing TEXT,
            organizer_id TEXT REFERENCES organizers(id) ON DELETE SET NULL,
            search_text TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_events_start_at ON events(start_at)",
        "CREATE INDEX IF NOT EXISTS idx_events_category ON events(category)",
        "CREATE INDEX IF NOT EXISTS idx_events_venue_id ON events(venue_id)",
        "CREATE INDEX IF NOT EXISTS idx_events_organizer_id ON events(organizer_id)",
    ] {
        sqlx::query(index).execute(pool).await?;
    }

    tracing::info!("Database tables initialized (events, venues, organizers)");

    Ok(())
}

/// Decode a stored TEXT id
pub(crate) fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| Error::Persistence(format!("Corrupt id {:?}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_tables_is_idempotent() {
        let pool = init_memory_pool().await.expect("Failed to create in-memory database");
        init_tables(&pool).await.expect("Second initialization failed");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables, vec!["events", "organizers", "venues"]);
    }

    #[tokio::test]
    async fn test_file_database_created_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("eventfinder.db");
        let url = format!("sqlite://{}", db_path.display());

        let pool = init_database_pool(&url).await.expect("Database initialization failed");
        assert!(db_path.exists(), "Database file was not created");
        pool.close().await;
    }

    #[tokio::test]
    async fn test_invalid_url_is_config_error() {
        let result = init_database_pool("postgres://nope").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
