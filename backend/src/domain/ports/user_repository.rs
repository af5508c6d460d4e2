//! Port abstraction for user persistence adapters and their errors.
//!
//! Absence is never an error here: lookups return `None` and mutations report
//! the number of affected rows, leaving the not-found decision to services.

use async_trait::async_trait;
use pagination::{Page, Pagination};

use crate::domain::{NewUserRecord, StoredCredentials, User, UserChanges, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique column (username or email) is already taken.
        Conflict { message: String } => "user repository conflict: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user row.
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Overwrite the supplied fields, returning the number of rows touched.
    async fn update(&self, id: &UserId, changes: &UserChanges)
    -> Result<u64, UserRepositoryError>;

    /// Remove a user, returning the number of rows deleted.
    async fn delete(&self, id: &UserId) -> Result<u64, UserRepositoryError>;

    /// One page of users ordered by id.
    async fn list(&self, pagination: &Pagination) -> Result<Page<User>, UserRepositoryError>;

    /// Credentials for a login attempt.
    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;
}
