//! Find-or-create by exact name

use super::parse_id;
use evf_common::time;
use evf_common::models::{NormalizedRef, RecordKind};
use evf_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Return the record whose name equals `name`, creating a stub if none does
///
/// The no-op `DO UPDATE` makes `RETURNING` yield the existing row on
/// conflict, so lookup and insert are one atomic statement and the stored
/// name and `updated_at` of an existing record are left untouched.
pub async fn find_or_create(pool: &SqlitePool, kind: RecordKind, name: &str) -> Result<NormalizedRef> {
    let candidate_id = Uuid::new_v4();
    let now = time::now();
    // Collection segment doubles as the table name
    let table = kind.collection();

    let sql = format!(
        "INSERT INTO {table} (id, name, created_at, updated_at) VALUES (?, ?, ?, ?) \
         ON CONFLICT(name) DO UPDATE SET name = {table}.name \
         RETURNING id, name",
        table = table
    );

    let row = sqlx::query(&sql)
        .bind(candidate_id.to_string())
        .bind(name)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

    let id: String = row.try_get("id")?;
    let reference = NormalizedRef {
        id: parse_id(&id)?,
        name: row.try_get("name")?,
    };

    if reference.id == candidate_id {
        tracing::info!(kind = %kind, name = %reference.name, id = %reference.id, "Created stub record");
    } else {
        tracing::debug!(kind = %kind, name = %reference.name, id = %reference.id, "Resolved existing record");
    }

    Ok(reference)
}
