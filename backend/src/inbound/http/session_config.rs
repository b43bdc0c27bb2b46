//! Session middleware configuration.
//!
//! The cookie is HTTP-only and encrypted; it carries only the user id. The
//! deadline is 30 days, refreshed on state changes.

use actix_session::config::PersistentSession;
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};

/// Session cookie name shared with clients.
pub const SESSION_COOKIE: &str = "session";

/// Session lifetime in days.
pub const SESSION_TTL_DAYS: i64 = 30;

/// Build the session middleware from the signing key.
///
/// `secure` should be true everywhere except plain-HTTP local development.
pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_http_only(true)
        .cookie_secure(secure)
        .cookie_same_site(if secure { SameSite::None } else { SameSite::Lax })
        .session_lifecycle(
            PersistentSession::default().session_ttl(Duration::days(SESSION_TTL_DAYS)),
        )
        .build()
}
