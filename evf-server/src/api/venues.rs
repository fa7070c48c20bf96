//! Venue endpoints, including name normalization

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use evf_common::models::{NormalizeRequest, NormalizedRef, RecordKind, Venue, VenueInput};
use serde_json::{json, Value};

use super::extract::{parse_path_id, ApiJson};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::services;
use crate::AppState;

/// GET /api/venues
pub async fn list_venues(State(state): State<AppState>) -> ApiResult<ApiJson<Vec<Venue>>> {
    Ok(ApiJson(db::venues::list(&state.db).await?))
}

/// GET /api/venues/:id
pub async fn get_venue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiJson<Venue>> {
    let id = parse_path_id(&id, "venue")?;
    db::venues::find_by_id(&state.db, id)
        .await?
        .map(ApiJson)
        .ok_or_else(|| ApiError::not_found("Venue"))
}

/// POST /api/venues
pub async fn create_venue(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<VenueInput>,
) -> ApiResult<(StatusCode, ApiJson<Venue>)> {
    let record = input.into_record()?;
    let venue = db::venues::create(&state.db, &record).await?;

    tracing::info!(id = %venue.id, name = %venue.name, "Created venue");
    Ok((StatusCode::CREATED, ApiJson(venue)))
}

/// PUT /api/venues/:id
pub async fn replace_venue(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<VenueInput>,
) -> ApiResult<ApiJson<Venue>> {
    let id = parse_path_id(&id, "venue")?;
    let record = input.into_record()?;

    let venue = db::venues::replace(&state.db, id, &record)
        .await?
        .ok_or_else(|| ApiError::not_found("Venue"))?;

    tracing::info!(id = %venue.id, name = %venue.name, "Replaced venue");
    Ok(ApiJson(venue))
}

/// DELETE /api/venues/:id
pub async fn delete_venue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiJson<Value>> {
    let id = parse_path_id(&id, "venue")?;
    if !db::venues::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Venue"));
    }

    tracing::info!(id = %id, "Deleted venue");
    Ok(ApiJson(json!({ "message": "Venue deleted" })))
}

/// POST /api/venues/normalize
pub async fn normalize_venue(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NormalizeRequest>,
) -> ApiResult<ApiJson<NormalizedRef>> {
    let reference = services::normalize(&state.db, RecordKind::Venue, &request.name).await?;
    Ok(ApiJson(reference))
}

/// Build venue routes
pub fn venue_routes() -> Router<AppState> {
    Router::new()
        .route("/api/venues", get(list_venues).post(create_venue))
        .route("/api/venues/normalize", post(normalize_venue))
        .route(
            "/api/venues/:id",
            get(get_venue).put(replace_venue).delete(delete_venue),
        )
}
