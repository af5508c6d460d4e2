//! Password login backed by stored credentials.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::access::Caller;
use crate::domain::ports::{LoginService, PasswordHasher, UserRepository, UserRepositoryError};
use crate::domain::user_service::map_hash_error;
use crate::domain::{Error, LoginCredentials, UserId, Username};

const INVALID_CREDENTIALS: &str = "invalid credentials";

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } | UserRepositoryError::Conflict { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// [`LoginService`] that verifies a password against the stored digest.
///
/// Unknown usernames and wrong passwords produce the same error.
#[derive(Clone)]
pub struct CredentialsLoginService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
}

impl<R, H> CredentialsLoginService<R, H> {
    pub fn new(users: Arc<R>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl<R, H> LoginService for CredentialsLoginService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Caller, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let Some(stored) = self
            .users
            .find_credentials(&username)
            .await
            .map_err(map_repository_error)?
        else {
            debug!("login for unknown username");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let verified = self
            .hasher
            .verify(credentials.password(), &stored.password_digest)
            .map_err(map_hash_error)?;
        if !verified {
            debug!(user_id = %stored.user_id, "login with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(Caller::new(stored.user_id, stored.role))
    }

    async fn resolve_session(&self, user_id: &UserId) -> Result<Option<Caller>, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_repository_error)?;
        if user.is_none() {
            debug!(user_id = %user_id, "session refers to a deleted account");
        }
        Ok(user.map(|user| Caller::new(*user.id(), user.role())))
    }
}
