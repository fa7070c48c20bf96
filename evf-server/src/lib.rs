//! evf-server library interface
//!
//! REST backend for Eventfinder: events, venues and organizers over one
//! SQLite store. Exposed as a library so integration tests (and the
//! scraper's end-to-end test) can build the router in-process.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Directory served at `/` for non-API paths, if any
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self { db, static_dir: None }
    }

    pub fn with_static_dir(mut self, static_dir: Option<PathBuf>) -> Self {
        self.static_dir = static_dir;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.static_dir.clone();

    let router = Router::new()
        .merge(api::health_routes())
        .merge(api::event_routes())
        .merge(api::venue_routes())
        .merge(api::organizer_routes())
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
