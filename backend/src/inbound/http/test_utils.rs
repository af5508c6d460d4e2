//! Test helpers for inbound HTTP components.
//!
//! Also compiled with the `test-support` feature so the integration tests
//! under `tests/` can log callers in without a password round trip.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, Resource, test, web};

use super::ApiResult;
use super::session::SessionContext;
use super::session_config::SESSION_COOKIE_NAME;
use crate::domain::access::Caller;

/// Path of the helper route returned by [`test_login_resource`].
pub const TEST_LOGIN_PATH: &str = "/__test/login";

/// Build a session middleware configured for tests.
///
/// Generates a fresh key per invocation and disables the `Secure` flag so
/// plain-HTTP test requests keep the cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build()
}

/// Route that stores the posted [`Caller`] in the session.
pub fn test_login_resource() -> Resource {
    web::resource(TEST_LOGIN_PATH).route(web::post().to(
        |session: SessionContext, caller: web::Json<Caller>| async move {
            session.persist_caller(&caller)?;
            ApiResult::Ok(HttpResponse::NoContent().finish())
        },
    ))
}

/// Request hitting [`test_login_resource`] for `caller`.
pub fn login_request(caller: &Caller) -> test::TestRequest {
    test::TestRequest::post()
        .uri(TEST_LOGIN_PATH)
        .set_json(caller)
}

/// Login port whose sessions resolve to `accounts` and nobody else.
#[cfg(test)]
pub fn resolving_login(
    accounts: impl IntoIterator<Item = Caller>,
) -> crate::domain::ports::MockLoginService {
    let accounts: Vec<Caller> = accounts.into_iter().collect();
    let mut login = crate::domain::ports::MockLoginService::new();
    login
        .expect_resolve_session()
        .returning(move |id| Ok(accounts.iter().find(|caller| caller.user_id == *id).copied()));
    login
}

/// Session cookie set on `res`.
///
/// # Panics
///
/// Panics when the response carries no session cookie.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
        .expect("response sets the session cookie")
}
