//! Venue and organizer name normalization
//!
//! Maps a free-text name onto a stable record id, creating a stub record
//! the first time a name is seen. Matching is exact after trimming
//! surrounding whitespace; no case folding or fuzzy matching.

use crate::db::normalize::find_or_create;
use evf_common::models::{NormalizedRef, RecordKind};
use evf_common::{Error, Result};
use sqlx::SqlitePool;

pub async fn normalize(pool: &SqlitePool, kind: RecordKind, name: &str) -> Result<NormalizedRef> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation(format!("{} name is required", kind)));
    }

    find_or_create(pool, kind, name).await
}
