//! HTTP middleware: session guard gates, CORS and security headers

pub mod auth;
pub mod cors;
pub mod security;

pub use auth::{ActivePrincipalGuard, CurrentPrincipal, CurrentToken, JwtAuth, SessionGuardWrapper};
pub use cors::create_cors;
pub use security::SecurityHeaders;
