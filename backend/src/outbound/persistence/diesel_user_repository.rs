//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, Pagination};
use tracing::warn;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    NewUserRecord, PasswordDigest, StoredCredentials, User, UserChanges, UserId, Username,
};

use super::diesel_basic_error_mapping::{
    DieselErrorConstructors, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_helpers::{limit_and_offset, to_affected, to_total};
use super::models::{CredentialsRow, NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        DieselErrorConstructors {
            query: UserRepositoryError::query,
            connection: UserRepositoryError::connection,
            conflict: UserRepositoryError::conflict,
        },
    )
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let id = row.id;
    User::try_from(row).map_err(|err| {
        warn!(user_id = %id, error = %err, "stored user row failed validation");
        UserRepositoryError::query(format!("invalid user row {id}: {err}"))
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *record.id.as_uuid(),
            name: record.profile.name.as_ref(),
            username: record.profile.username.as_ref(),
            email: record.profile.email.as_ref(),
            password_hash: record.password_digest.as_str(),
            role: record.role.as_str(),
        };
        let inserted = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_user(inserted)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn update(
        &self,
        id: &UserId,
        changes: &UserChanges,
    ) -> Result<u64, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        if changes.is_empty() {
            let count: i64 = users::table
                .find(id.as_uuid())
                .count()
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            return Ok(to_total(count));
        }
        let update = UserUpdate {
            name: changes.name.as_ref().map(AsRef::as_ref),
            username: changes.username.as_ref().map(AsRef::as_ref),
            email: changes.email.as_ref().map(AsRef::as_ref),
        };
        let affected = diesel::update(users::table.find(id.as_uuid()))
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_affected(affected))
    }

    async fn delete(&self, id: &UserId) -> Result<u64, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_affected(deleted))
    }

    async fn list(&self, pagination: &Pagination) -> Result<Page<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = limit_and_offset(pagination).map_err(map_diesel_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order(users::id.asc())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Page::new(rows, to_total(total), *pagination).try_map(row_to_user)
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(CredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| {
            let role = row.role.parse().map_err(|err| {
                UserRepositoryError::query(format!("invalid role for user {}: {err}", row.id))
            })?;
            Ok(StoredCredentials {
                user_id: UserId::from_uuid(row.id),
                role,
                password_digest: PasswordDigest::new(row.password_hash),
            })
        })
        .transpose()
    }
}
