//! Organizer endpoints, including name normalization

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use evf_common::models::{NormalizeRequest, NormalizedRef, Organizer, OrganizerInput, RecordKind};
use serde_json::{json, Value};

use super::extract::{parse_path_id, ApiJson};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::services;
use crate::AppState;

pub async fn list_organizers(State(state): State<AppState>) -> ApiResult<ApiJson<Vec<Organizer>>> {
    Ok(ApiJson(db::organizers::list(&state.db).await?))
}

pub async fn get_organizer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiJson<Organizer>> {
    let id = parse_path_id(&id, "organizer")?;
    db::organizers::find_by_id(&state.db, id)
        .await?
        .map(ApiJson)
        .ok_or_else(|| ApiError::not_found("Organizer"))
}

pub async fn create_organizer(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<OrganizerInput>,
) -> ApiResult<(StatusCode, ApiJson<Organizer>)> {
    let organizer = db::organizers::create(&state.db, &input.into_record()?).await?;

    tracing::info!(id = %organizer.id, name = %organizer.name, "Created organizer");
    Ok((StatusCode::CREATED, ApiJson(organizer)))
}

pub async fn replace_organizer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<OrganizerInput>,
) -> ApiResult<ApiJson<Organizer>> {
    let id = parse_path_id(&id, "organizer")?;
    let record = input.into_record()?;

    db::organizers::replace(&state.db, id, &record)
        .await?
        .map(ApiJson)
        .ok_or_else(|| ApiError::not_found("Organizer"))
}

pub async fn delete_organizer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiJson<Value>> {
    let id = parse_path_id(&id, "organizer")?;
    if !db::organizers::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Organizer"));
    }

    tracing::info!(id = %id, "Deleted organizer");
    Ok(ApiJson(json!({ "message": "Organizer deleted" })))
}

/// POST /api/organizers/normalize
pub async fn normalize_organizer(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NormalizeRequest>,
) -> ApiResult<ApiJson<NormalizedRef>> {
    let reference = services::normalize(&state.db, RecordKind::Organizer, &request.name).await?;
    Ok(ApiJson(reference))
}

/// Build organizer routes
pub fn organizer_routes() -> Router<AppState> {
    Router::new()
        .route("/api/organizers", get(list_organizers).post(create_organizer))
        .route("/api/organizers/normalize", post(normalize_organizer))
        .route(
            "/api/organizers/:id",
            get(get_organizer).put(replace_organizer).delete(delete_organizer),
        )
}
