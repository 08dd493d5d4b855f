//! Cookie session transport
//!
//! Carries the signed token between client and server. The primary channel is
//! an `HttpOnly` cookie scoped to the whole application; a bearer header is
//! accepted as a fallback by the request guard. In development a non-HttpOnly
//! mirror cookie is also set so the token can be inspected from scripts; the
//! mirror must never exist in production.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::config::Environment;

/// Name of the session cookie.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Name of the development-only debug mirror cookie.
pub const DEBUG_TOKEN_COOKIE: &str = "access_token_debug";

/// Cookie attribute settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub environment: Environment,
    /// Max-Age in seconds; kept equal to the token TTL.
    pub max_age_seconds: u64,
}

/// Build the session cookie carrying the token.
///
/// Always `HttpOnly` and `Path=/`; `Secure` + `SameSite=Strict` in
/// production, `SameSite=Lax` without `Secure` in development.
pub fn session_cookie(token: &str, settings: &CookieSettings) -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_max_age(Duration::seconds(settings.max_age_seconds as i64));

    if settings.environment.is_production() {
        cookie.set_secure(true);
        cookie.set_same_site(SameSite::Strict);
    } else {
        cookie.set_secure(false);
        cookie.set_same_site(SameSite::Lax);
    }

    cookie
}

/// Build the development-only mirror cookie. Callers must gate on the
/// environment; this function never runs in production paths.
pub fn debug_mirror_cookie(token: &str, settings: &CookieSettings) -> Cookie<'static> {
    let mut cookie = Cookie::new(DEBUG_TOKEN_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(false);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::seconds(settings.max_age_seconds as i64));
    cookie
}

/// Build a removal cookie with the same path the session cookie was set with;
/// browsers will not clear a cookie whose path does not match.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie
}
