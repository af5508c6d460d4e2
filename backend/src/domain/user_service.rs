//! User account services.
//!
//! Implements [`UserCommand`] and [`UserQuery`] over a [`UserRepository`],
//! applying the access policy before any repository call.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, Pagination};
use serde_json::json;
use tracing::{debug, info};

use crate::domain::access::{AllowedRoles, Caller, authorize, resolve_user_target};
use crate::domain::ports::{
    PasswordHashError, PasswordHasher, UserCommand, UserQuery, UserRepository, UserRepositoryError,
};
use crate::domain::{Error, NewUser, NewUserRecord, Role, User, UserChanges, UserId};

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::Conflict { message } => {
            debug!(%message, "user write rejected by unique constraint");
            Error::conflict("username or email is already registered")
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

/// Error raised when a user lookup or mutation finds nothing.
///
/// User flows report a missing id as a bad request carrying the id the
/// client asked for.
pub fn user_not_found(requested: &UserId) -> Error {
    Error::invalid_request(format!(
        "User with id: {requested} cannot be found. Check Id again in URL"
    ))
    .with_details(json!({ "id": requested.to_string(), "code": "user_not_found" }))
}

/// User service implementing the user driving ports.
#[derive(Clone)]
pub struct UserService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
}

impl<R, H> UserService<R, H> {
    /// Create a new service with the given repository and hasher.
    pub fn new(users: Arc<R>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

impl<R, H> UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn insert(&self, user: NewUser) -> Result<User, Error> {
        if !user.confirmation_matches() {
            return Err(
                Error::invalid_request("password confirmation does not match").with_details(
                    json!({ "field": "passwordConfirm", "code": "password_mismatch" }),
                ),
            );
        }
        let password_digest = self.hasher.hash(user.password()).map_err(map_hash_error)?;
        let record = NewUserRecord {
            id: UserId::generate(),
            profile: user.profile().clone(),
            role: user.role(),
            password_digest,
        };
        let created = self
            .users
            .create(&record)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %created.id(), role = %created.role(), "user created");
        Ok(created)
    }

    /// Create `user` as an administrator unless its username is already taken.
    ///
    /// Returns `None` when an account with that username exists, whatever its
    /// role.
    pub async fn ensure_admin(&self, user: NewUser) -> Result<Option<User>, Error> {
        let existing = self
            .users
            .find_credentials(&user.profile().username)
            .await
            .map_err(map_repository_error)?;
        if existing.is_some() {
            return Ok(None);
        }
        self.insert(user.with_role(Role::Admin)).await.map(Some)
    }
}

#[async_trait]
impl<R, H> UserCommand for UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, user: NewUser) -> Result<User, Error> {
        self.insert(user.with_role(Role::User)).await
    }

    async fn create_user(&self, caller: &Caller, user: NewUser) -> Result<User, Error> {
        authorize(caller, &AllowedRoles::admin_only())?;
        self.insert(user).await
    }

    async fn update_user(
        &self,
        caller: &Caller,
        requested: UserId,
        changes: UserChanges,
    ) -> Result<User, Error> {
        let target = resolve_user_target(caller, requested);
        if !changes.is_empty() {
            let updated = self
                .users
                .update(&target, &changes)
                .await
                .map_err(map_repository_error)?;
            if updated == 0 {
                return Err(user_not_found(&requested));
            }
        }
        self.users
            .find_by_id(&target)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| user_not_found(&requested))
    }

    async fn delete_user(&self, caller: &Caller, requested: UserId) -> Result<(), Error> {
        let target = resolve_user_target(caller, requested);
        let deleted = self
            .users
            .delete(&target)
            .await
            .map_err(map_repository_error)?;
        if deleted == 0 {
            return Err(user_not_found(&requested));
        }
        info!(user_id = %target, "user deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, H> UserQuery for UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn get_user(&self, caller: &Caller, requested: UserId) -> Result<User, Error> {
        let target = resolve_user_target(caller, requested);
        self.users
            .find_by_id(&target)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| user_not_found(&requested))
    }

    async fn list_users(
        &self,
        caller: &Caller,
        pagination: Pagination,
    ) -> Result<Page<User>, Error> {
        authorize(caller, &AllowedRoles::admin_only())?;
        self.users
            .list(&pagination)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
