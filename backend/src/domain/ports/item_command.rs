//! Driving port for item mutations.
//!
//! The caller is always the owner; there is no way to act on another user's
//! items through this port.

use async_trait::async_trait;

use crate::domain::access::Caller;
use crate::domain::{Error, Item, ItemChanges, ItemFields, ItemId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemCommand: Send + Sync {
    /// Create an item owned by the caller.
    async fn create_item(&self, caller: &Caller, fields: ItemFields) -> Result<Item, Error>;

    /// Apply `changes` to one of the caller's items and return it.
    async fn update_item(
        &self,
        caller: &Caller,
        id: ItemId,
        changes: ItemChanges,
    ) -> Result<Item, Error>;

    /// Delete one of the caller's items.
    async fn delete_item(&self, caller: &Caller, id: ItemId) -> Result<(), Error>;
}
