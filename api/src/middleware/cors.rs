//! CORS configuration for the browser client.
//!
//! Credentials are always allowed: the refresh cookie must travel with
//! cross-origin calls to the refresh and logout endpoints. Because of that
//! the allowed origins are an explicit list even in development, never `*`.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use tracing::info;

use gb_shared::config::CorsConfig;

pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .supports_credentials()
        .max_age(config.max_age);

    for origin in &config.allowed_origins {
        info!(origin = %origin, "Adding allowed CORS origin");
        cors = cors.allowed_origin(origin);
    }

    cors
}
