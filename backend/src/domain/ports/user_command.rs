//! Driving port for user mutations.

use async_trait::async_trait;

use crate::domain::access::Caller;
use crate::domain::{Error, NewUser, User, UserChanges, UserId};

/// Use cases that create, change or remove users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Public signup. The account always receives the `user` role.
    async fn register(&self, user: NewUser) -> Result<User, Error>;

    /// Administrative creation with a caller-chosen role.
    async fn create_user(&self, caller: &Caller, user: NewUser) -> Result<User, Error>;

    /// Apply `changes` to the effective target and return the stored user.
    async fn update_user(
        &self,
        caller: &Caller,
        requested: UserId,
        changes: UserChanges,
    ) -> Result<User, Error>;

    /// Delete the effective target.
    async fn delete_user(&self, caller: &Caller, requested: UserId) -> Result<(), Error>;
}
