//! Item services.
//!
//! The caller's session id is always the owner: every repository call is
//! scoped by it, so foreign items surface as not found.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, Pagination};
use tracing::{debug, info};

use crate::domain::access::Caller;
use crate::domain::ports::{ItemCommand, ItemQuery, ItemRepository, ItemRepositoryError};
use crate::domain::{Error, Item, ItemChanges, ItemFields, ItemId};

/// Client-facing text for constraint violations; the owner vanished mid-request.
pub(crate) const ITEM_CONFLICT_MESSAGE: &str = "item conflicts with the current state of its owner";

fn map_repository_error(error: ItemRepositoryError) -> Error {
    match error {
        ItemRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("item repository unavailable: {message}"))
        }
        ItemRepositoryError::Query { message } => {
            Error::internal(format!("item repository error: {message}"))
        }
        ItemRepositoryError::Conflict { message } => {
            debug!(%message, "item write rejected by constraint");
            Error::conflict(ITEM_CONFLICT_MESSAGE)
        }
    }
}

/// Error raised when an owned item cannot be located.
pub fn item_not_found(id: &ItemId) -> Error {
    Error::not_found(format!(
        "Item with id: {id} cannot be found. Check Id again in URL"
    ))
}

/// Item service implementing the item driving ports.
#[derive(Clone)]
pub struct ItemService<R> {
    items: Arc<R>,
}

impl<R> ItemService<R> {
    /// Service over the given item repository.
    pub fn new(items: Arc<R>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl<R> ItemCommand for ItemService<R>
where
    R: ItemRepository,
{
    async fn create_item(&self, caller: &Caller, fields: ItemFields) -> Result<Item, Error> {
        let item = Item::new(ItemId::generate(), caller.user_id, fields);
        let created = self
            .items
            .create(&item)
            .await
            .map_err(map_repository_error)?;
        info!(item_id = %created.id(), owner = %caller.user_id, "item created");
        Ok(created)
    }

    async fn update_item(
        &self,
        caller: &Caller,
        id: ItemId,
        changes: ItemChanges,
    ) -> Result<Item, Error> {
        if !changes.is_empty() {
            let updated = self
                .items
                .update_owned(&id, &caller.user_id, &changes)
                .await
                .map_err(map_repository_error)?;
            if updated == 0 {
                return Err(item_not_found(&id));
            }
        }
        self.items
            .find_owned(&id, &caller.user_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| item_not_found(&id))
    }

    async fn delete_item(&self, caller: &Caller, id: ItemId) -> Result<(), Error> {
        let deleted = self
            .items
            .delete_owned(&id, &caller.user_id)
            .await
            .map_err(map_repository_error)?;
        if deleted == 0 {
            return Err(item_not_found(&id));
        }
        Ok(())
    }
}

#[async_trait]
impl<R> ItemQuery for ItemService<R>
where
    R: ItemRepository,
{
    async fn get_item(&self, caller: &Caller, id: ItemId) -> Result<Item, Error> {
        self.items
            .find_owned(&id, &caller.user_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| item_not_found(&id))
    }

    async fn list_items(
        &self,
        caller: &Caller,
        pagination: Pagination,
    ) -> Result<Page<Item>, Error> {
        self.items
            .list_owned(&caller.user_id, &pagination)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "item_service_tests.rs"]
mod tests;
