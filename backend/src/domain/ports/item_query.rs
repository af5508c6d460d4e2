//! Driving port for item reads.

use async_trait::async_trait;
use pagination::{Page, Pagination};

use crate::domain::access::Caller;
use crate::domain::{Error, Item, ItemId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemQuery: Send + Sync {
    /// Fetch one of the caller's items.
    async fn get_item(&self, caller: &Caller, id: ItemId) -> Result<Item, Error>;

    /// One page of the caller's items.
    async fn list_items(&self, caller: &Caller, pagination: Pagination)
    -> Result<Page<Item>, Error>;
}
