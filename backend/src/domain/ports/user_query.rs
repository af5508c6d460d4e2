//! Driving port for user reads.

use async_trait::async_trait;
use pagination::{Page, Pagination};

use crate::domain::access::Caller;
use crate::domain::{Error, User, UserId};

/// Use cases that read users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserQuery: Send + Sync {
    /// Fetch the effective target.
    async fn get_user(&self, caller: &Caller, requested: UserId) -> Result<User, Error>;

    /// List every user. Administrators only.
    async fn list_users(&self, caller: &Caller, pagination: Pagination)
    -> Result<Page<User>, Error>;
}
