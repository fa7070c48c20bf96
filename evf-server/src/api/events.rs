//! Event endpoints
//!
//! `POST /api/events` is the scraper's write path and upserts by slug;
//! `PUT /api/events/:id` is a plain full replace by id.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use evf_common::models::{Event, EventDetails, EventInput, SlugPolicy};
use evf_common::time::{end_of_day, parse_date_only, parse_flexible};
use serde::Deserialize;
use serde_json::{json, Value};

use super::extract::{parse_path_id, ApiJson, ApiQuery};
use crate::db::{self, events::EventFilter};
use crate::error::{ApiError, ApiResult};
use crate::services;
use crate::AppState;

/// Query parameters for `GET /api/events`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
}

impl EventListQuery {
    fn into_filter(self) -> ApiResult<EventFilter> {
        // Empty form fields mean "no filter", dates included
        let from = non_blank(self.start_date)
            .map(|raw| parse_bound(&raw, "startDate", false))
            .transpose()?;
        let to = non_blank(self.end_date)
            .map(|raw| parse_bound(&raw, "endDate", true))
            .transpose()?;

        Ok(EventFilter {
            from,
            to,
            search: non_blank(self.search),
            category: non_blank(self.category),
        })
    }
}

/// A date-only upper bound covers the whole day
fn parse_bound(raw: &str, param: &str, upper: bool) -> ApiResult<DateTime<Utc>> {
    let raw = raw.trim();
    if upper {
        if let Some(date) = parse_date_only(raw) {
            return Ok(end_of_day(date));
        }
    }
    parse_flexible(raw).ok_or_else(|| ApiError::BadRequest(format!("Invalid {}: {}", param, raw)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EventListQuery>,
) -> ApiResult<ApiJson<Vec<Event>>> {
    let filter = query.into_filter()?;
    let events = db::events::list(&state.db, &filter).await?;
    Ok(ApiJson(events))
}

/// GET /api/events/:id
///
/// Resolves the venue and organizer references; a reference whose record
/// has since been deleted is simply left unresolved.
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiJson<EventDetails>> {
    let id = parse_path_id(&id, "event")?;
    let event = db::events::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event"))?;

    let venue = match event.location.venue_id {
        Some(venue_id) => db::venues::find_by_id(&state.db, venue_id).await?,
        None => None,
    };
    let organizer_details = match event.organizer {
        Some(organizer_id) => db::organizers::find_by_id(&state.db, organizer_id).await?,
        None => None,
    };

    Ok(ApiJson(EventDetails {
        event,
        venue,
        organizer_details,
    }))
}

/// POST /api/events
///
/// 201 when the slug was new, 200 when an existing event was replaced.
pub async fn upsert_event(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<EventInput>,
) -> ApiResult<(StatusCode, ApiJson<Event>)> {
    let outcome = services::upsert_event(&state.db, input).await?;
    let status = if outcome.is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, ApiJson(outcome.event)))
}

/// PUT /api/events/:id
pub async fn replace_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<EventInput>,
) -> ApiResult<ApiJson<Event>> {
    let id = parse_path_id(&id, "event")?;
    let record = input.into_record(SlugPolicy::DeriveFromTitle)?;

    let event = db::events::replace(&state.db, id, &record)
        .await?
        .ok_or_else(|| ApiError::not_found("Event"))?;

    tracing::info!(id = %event.id, slug = %event.slug, "Replaced event");
    Ok(ApiJson(event))
}

/// DELETE /api/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiJson<Value>> {
    let id = parse_path_id(&id, "event")?;
    if !db::events::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Event"));
    }

    tracing::info!(id = %id, "Deleted event");
    Ok(ApiJson(json!({ "message": "Event deleted" })))
}

/// Build event routes
pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events).post(upsert_event))
        .route(
            "/api/events/:id",
            get(get_event).put(replace_event).delete(delete_event),
        )
}
