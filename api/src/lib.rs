//! # Gigboard API
//!
//! actix-web surface of the Gigboard auth core: request bodies, the error
//! envelope, the session guard middleware and the route handlers.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{build_components, create_app, AppComponents};
pub use routes::AppState;
