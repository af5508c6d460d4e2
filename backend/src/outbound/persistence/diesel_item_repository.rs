//! PostgreSQL-backed `ItemRepository` implementation using Diesel ORM.
//!
//! Every statement filters on both `id` and `user_id`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, Pagination};
use tracing::warn;

use crate::domain::ports::{ItemRepository, ItemRepositoryError};
use crate::domain::{Item, ItemChanges, ItemId, UserId};

use super::diesel_basic_error_mapping::{
    DieselErrorConstructors, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_helpers::{limit_and_offset, to_affected, to_total};
use super::models::{ItemRow, ItemUpdate, NewItemRow};
use super::pool::{DbPool, PoolError};
use super::schema::items;

/// Diesel-backed implementation of the `ItemRepository` port.
#[derive(Clone)]
pub struct DieselItemRepository {
    pool: DbPool,
}

impl DieselItemRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ItemRepositoryError {
    map_basic_pool_error(error, ItemRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ItemRepositoryError {
    map_basic_diesel_error(
        error,
        DieselErrorConstructors {
            query: ItemRepositoryError::query,
            connection: ItemRepositoryError::connection,
            conflict: ItemRepositoryError::conflict,
        },
    )
}

fn row_to_item(row: ItemRow) -> Result<Item, ItemRepositoryError> {
    let id = row.id;
    Item::try_from(row).map_err(|err| {
        warn!(item_id = %id, error = %err, "stored item row failed validation");
        ItemRepositoryError::query(format!("invalid item row {id}: {err}"))
    })
}

#[async_trait]
impl ItemRepository for DieselItemRepository {
    async fn create(&self, item: &Item) -> Result<Item, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(items::table)
            .values(NewItemRow::from(item))
            .returning(ItemRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_item(inserted)
    }

    async fn find_owned(
        &self,
        id: &ItemId,
        owner: &UserId,
    ) -> Result<Option<Item>, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        items::table
            .filter(items::id.eq(id.as_uuid()))
            .filter(items::user_id.eq(owner.as_uuid()))
            .select(ItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_item)
            .transpose()
    }

    async fn update_owned(
        &self,
        id: &ItemId,
        owner: &UserId,
        changes: &ItemChanges,
    ) -> Result<u64, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let scope = items::table
            .filter(items::id.eq(id.as_uuid()))
            .filter(items::user_id.eq(owner.as_uuid()));
        if changes.is_empty() {
            let count: i64 = scope
                .count()
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            return Ok(to_total(count));
        }
        let update = ItemUpdate {
            title: changes.title.as_ref().map(AsRef::as_ref),
            priority: changes.priority.map(|priority| priority.as_str()),
            description: changes.description.as_ref().map(AsRef::as_ref),
            due_date: changes.due_date,
        };
        let affected = diesel::update(scope)
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_affected(affected))
    }

    async fn delete_owned(&self, id: &ItemId, owner: &UserId) -> Result<u64, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            items::table
                .filter(items::id.eq(id.as_uuid()))
                .filter(items::user_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(to_affected(deleted))
    }

    async fn list_owned(
        &self,
        owner: &UserId,
        pagination: &Pagination,
    ) -> Result<Page<Item>, ItemRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = limit_and_offset(pagination).map_err(map_diesel_error)?;
        let total: i64 = items::table
            .filter(items::user_id.eq(owner.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ItemRow> = items::table
            .filter(items::user_id.eq(owner.as_uuid()))
            .select(ItemRow::as_select())
            .order(items::id.asc())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Page::new(rows, to_total(total), *pagination).try_map(row_to_item)
    }
}
