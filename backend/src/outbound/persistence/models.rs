//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::NaiveDate;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    EmailAddress, Item, ItemDescription, ItemFields, ItemId, ItemTitle, ItemValidationError,
    PersonName, User, UserId, UserProfile, UserValidationError, Username,
};

use super::schema::{items, users};

/// Row struct for reading public user columns.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

/// Row struct for reading login credentials.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialsRow {
    pub id: Uuid,
    pub role: String,
    pub password_hash: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

/// Changeset for partial user updates; `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub name: Option<&'a str>,
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
}

impl TryFrom<UserRow> for User {
    type Error = UserValidationError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let profile = UserProfile {
            name: PersonName::new(row.name)?,
            username: Username::new(row.username)?,
            email: EmailAddress::new(row.email)?,
        };
        Ok(User::new(
            UserId::from_uuid(row.id),
            profile,
            row.role.parse()?,
        ))
    }
}

/// Row struct for reading items.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub priority: String,
    pub description: String,
    pub due_date: NaiveDate,
}

/// Insertable struct for creating new item records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = items)]
pub(crate) struct NewItemRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub priority: &'a str,
    pub description: &'a str,
    pub due_date: NaiveDate,
}

/// Changeset for partial item updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = items)]
pub(crate) struct ItemUpdate<'a> {
    pub title: Option<&'a str>,
    pub priority: Option<&'a str>,
    pub description: Option<&'a str>,
    pub due_date: Option<NaiveDate>,
}

impl<'a> From<&'a Item> for NewItemRow<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            id: *item.id().as_uuid(),
            user_id: *item.owner().as_uuid(),
            title: item.title().as_ref(),
            priority: item.priority().as_str(),
            description: item.description().as_ref(),
            due_date: item.due_date(),
        }
    }
}

impl TryFrom<ItemRow> for Item {
    type Error = ItemValidationError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let fields = ItemFields {
            title: ItemTitle::new(row.title)?,
            priority: row.priority.parse()?,
            description: ItemDescription::new(row.description)?,
            due_date: row.due_date,
        };
        Ok(Item::new(
            ItemId::from_uuid(row.id),
            UserId::from_uuid(row.user_id),
            fields,
        ))
    }
}
