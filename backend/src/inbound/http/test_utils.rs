//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::web;

use crate::domain::{Role, SessionClaims, UserId};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Claims for a fresh user holding `roles`.
pub fn claims_with(roles: impl IntoIterator<Item = Role>) -> SessionClaims {
    SessionClaims::new(UserId::random(), roles)
}

/// Fixture-backed state with selected ports replaced by the caller.
pub fn test_state(configure: impl FnOnce(&mut HttpStatePorts)) -> web::Data<HttpState> {
    let mut ports = HttpStatePorts::fixtures();
    configure(&mut ports);
    web::Data::new(HttpState::new(ports))
}
