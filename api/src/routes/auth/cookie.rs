//! Refresh cookie construction.
//!
//! The refresh token never appears in a response body. It is set and
//! cleared only through this cookie.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;

use gb_shared::config::CookieConfig;

fn same_site(value: &str) -> SameSite {
    match value.to_ascii_lowercase().as_str() {
        "lax" => SameSite::Lax,
        "none" => SameSite::None,
        _ => SameSite::Strict,
    }
}

fn base(config: &CookieConfig, value: String) -> Cookie<'static> {
    Cookie::build(config.name.clone(), value)
        .path(config.path.clone())
        .secure(config.secure)
        .http_only(config.http_only)
        .same_site(same_site(&config.same_site))
        .finish()
}

/// Cookie carrying a freshly issued refresh token for `max_age_seconds`
pub fn refresh_cookie(config: &CookieConfig, token: &str, max_age_seconds: i64) -> Cookie<'static> {
    let mut cookie = base(config, token.to_owned());
    cookie.set_max_age(Duration::seconds(max_age_seconds));
    cookie
}

/// Expired cookie with the same name and path, telling the browser to drop it
pub fn removal_cookie(config: &CookieConfig) -> Cookie<'static> {
    let mut cookie = base(config, String::new());
    cookie.make_removal();
    cookie
}

/// Refresh token presented by the client, if any
pub fn read_refresh_token(req: &HttpRequest, config: &CookieConfig) -> Option<String> {
    req.cookie(&config.name)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_refresh_cookie_attributes() {
        let config = CookieConfig {
            secure: true,
            ..Default::default()
        };
        let cookie = refresh_cookie(&config, "abc.def", 604_800);

        assert_eq!(cookie.name(), "refresh_token");
        assert_eq!(cookie.value(), "abc.def");
        assert_eq!(cookie.path(), Some("/api/v1/auth"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(604_800)));
    }

    #[test]
    fn test_removal_cookie_keeps_name_and_path() {
        let config = CookieConfig::default();
        let cookie = removal_cookie(&config);

        assert_eq!(cookie.name(), "refresh_token");
        assert_eq!(cookie.path(), Some("/api/v1/auth"));
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn test_read_refresh_token() {
        let config = CookieConfig::default();
        let req = TestRequest::default()
            .cookie(Cookie::new("refresh_token", "tok"))
            .to_http_request();
        assert_eq!(read_refresh_token(&req, &config).as_deref(), Some("tok"));

        let req = TestRequest::default()
            .cookie(Cookie::new("refresh_token", ""))
            .to_http_request();
        assert!(read_refresh_token(&req, &config).is_none());
    }

    #[test]
    fn test_same_site_parsing() {
        assert_eq!(same_site("Lax"), SameSite::Lax);
        assert_eq!(same_site("none"), SameSite::None);
        assert_eq!(same_site("bogus"), SameSite::Strict);
    }
}
