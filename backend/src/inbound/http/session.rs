//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie session carries the caller's `user_id` and `role`. The cookie
//! is only a claim: every request re-resolves it through
//! [`LoginService::resolve_session`], so deleted accounts lose access and the
//! stored role is the one that counts. Handlers use [`SessionContext`];
//! middleware that only sees a raw [`Session`] uses [`resolve_caller`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::access::Caller;
use crate::domain::ports::LoginService;
use crate::domain::{Error, Role, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLE_KEY: &str = "role";

/// Read the caller identity stored in `session`.
///
/// Tampered or partial entries are treated as no session at all.
pub fn read_caller(session: &Session) -> Result<Option<Caller>, Error> {
    let read = |key: &str| {
        session
            .get::<String>(key)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    };
    let (Some(raw_id), Some(raw_role)) = (read(USER_ID_KEY)?, read(ROLE_KEY)?) else {
        return Ok(None);
    };
    let user_id = match UserId::new(&raw_id) {
        Ok(id) => id,
        Err(error) => {
            warn!(%error, "invalid user id in session cookie");
            return Ok(None);
        }
    };
    match raw_role.parse::<Role>() {
        Ok(role) => Ok(Some(Caller::new(user_id, role))),
        Err(error) => {
            warn!(%error, "invalid role in session cookie");
            Ok(None)
        }
    }
}

/// Resolve the identity claimed by `session` against the account store.
///
/// A session whose account no longer exists is purged and treated as
/// anonymous.
pub async fn resolve_caller(
    session: &Session,
    login: &dyn LoginService,
) -> Result<Option<Caller>, Error> {
    let Some(claimed) = read_caller(session)? else {
        return Ok(None);
    };
    let resolved = login.resolve_session(&claimed.user_id).await?;
    match resolved {
        Some(caller) => Ok(Some(caller)),
        None => {
            warn!(user_id = %claimed.user_id, "dropping session of a deleted account");
            session.purge();
            Ok(None)
        }
    }
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated caller in the session cookie.
    ///
    /// The session id is renewed first so a pre-login cookie cannot be
    /// promoted.
    pub fn persist_caller(&self, caller: &Caller) -> Result<(), Error> {
        self.0.renew();
        let persist = |key: &str, value: String| {
            self.0
                .insert(key, value)
                .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
        };
        persist(USER_ID_KEY, caller.user_id.to_string())?;
        persist(ROLE_KEY, caller.role.to_string())
    }

    /// Fetch the current caller, if one is logged in and still exists.
    pub async fn caller(&self, login: &dyn LoginService) -> Result<Option<Caller>, Error> {
        resolve_caller(&self.0, login).await
    }

    /// Require an authenticated caller or return `401 Unauthorized`.
    pub async fn require_caller(&self, login: &dyn LoginService) -> Result<Caller, Error> {
        self.caller(login)
            .await?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop every session entry and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
