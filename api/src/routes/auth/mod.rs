//! Authentication route handlers
//!
//! This module contains the account and session endpoints:
//! - Worker and employer registration
//! - Login and refresh (refresh token carried in an HttpOnly cookie)
//! - Logout of the current session and of every session
//! - Password reset with a `password_reset` code
//! - The current principal

pub mod cookie;
pub mod login;
pub mod logout;
pub mod me;
pub mod password;
pub mod refresh;
pub mod register;

pub use login::login;
pub use logout::{logout, logout_all};
pub use me::me;
pub use password::reset_password;
pub use refresh::refresh;
pub use register::{register_employer, register_worker};

use actix_web::{http::header::AUTHORIZATION, HttpRequest};
use gb_core::services::bearer_credentials;

/// Bearer token from the `Authorization` header, without the scheme
pub(crate) fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_credentials)
}
