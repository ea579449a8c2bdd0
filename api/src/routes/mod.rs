//! Route handlers
//!
//! - `auth` - registration, login, refresh, logout, password reset, `/me`
//! - `otp` - one-time code request and verification

pub mod auth;
pub mod otp;

use actix_web::{http::header::USER_AGENT, HttpRequest};
use std::sync::Arc;

use gb_core::domain::entities::ClientMetadata;
use gb_core::repositories::{OtpRepository, PrincipalRepository, SessionRepository};
use gb_core::services::{AuthService, CacheServiceTrait, MailServiceTrait};
use gb_shared::config::CookieConfig;

/// Application state that holds shared services
pub struct AppState<P, S, O, C, M>
where
    P: PrincipalRepository,
    S: SessionRepository,
    O: OtpRepository,
    C: CacheServiceTrait,
    M: MailServiceTrait,
{
    pub auth_service: Arc<AuthService<P, S, O, C, M>>,
    pub cookie: CookieConfig,
}

/// Client address and user agent recorded on new refresh sessions
pub(crate) fn client_metadata(req: &HttpRequest) -> ClientMetadata {
    let ip = req.connection_info().realip_remote_addr().map(str::to_owned);
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    ClientMetadata::new(ip, user_agent)
}
