//! HTTP API handlers for evf-server

pub mod events;
pub mod extract;
pub mod health;
pub mod organizers;
pub mod venues;

pub use events::event_routes;
pub use extract::ApiJson;
pub use health::health_routes;
pub use organizers::organizer_routes;
pub use venues::venue_routes;
