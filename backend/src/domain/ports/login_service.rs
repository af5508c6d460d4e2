//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to authenticate credentials and to re-check the
//! identity a session claims, without knowing the backing infrastructure.

use async_trait::async_trait;

use crate::domain::access::Caller;
use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the identity to store in the session.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Caller, Error>;

    /// Current identity of the account a session points at.
    ///
    /// Returns `None` once the account has been deleted. The role is the
    /// stored one, not whatever the session recorded at login.
    async fn resolve_session(&self, user_id: &UserId) -> Result<Option<Caller>, Error>;
}
