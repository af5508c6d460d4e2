//! Port abstraction for item persistence.
//!
//! Every lookup and mutation is scoped by owner, so an item belonging to
//! someone else looks exactly like a missing one.

use async_trait::async_trait;
use pagination::{Page, Pagination};

use crate::domain::{Item, ItemChanges, ItemId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by item repository adapters.
    pub enum ItemRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "item repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "item repository query failed: {message}",
        /// A constraint rejected the write (for example a missing owner).
        Conflict { message: String } => "item repository conflict: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Insert a new item row.
    async fn create(&self, item: &Item) -> Result<Item, ItemRepositoryError>;

    /// Fetch an item if `owner` owns it.
    async fn find_owned(
        &self,
        id: &ItemId,
        owner: &UserId,
    ) -> Result<Option<Item>, ItemRepositoryError>;

    /// Overwrite the supplied fields of an owned item.
    async fn update_owned(
        &self,
        id: &ItemId,
        owner: &UserId,
        changes: &ItemChanges,
    ) -> Result<u64, ItemRepositoryError>;

    /// Remove an owned item.
    async fn delete_owned(&self, id: &ItemId, owner: &UserId) -> Result<u64, ItemRepositoryError>;

    /// One page of the owner's items ordered by id.
    async fn list_owned(
        &self,
        owner: &UserId,
        pagination: &Pagination,
    ) -> Result<Page<Item>, ItemRepositoryError>;
}
