//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// User accounts.
    ///
    /// `username` and `email` carry unique constraints; `role` is limited to
    /// `admin` and `user` by a CHECK constraint.
    users (id) {
        /// Primary key: UUID v7 identifier.
        id -> Uuid,
        name -> Varchar,
        username -> Varchar,
        email -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        role -> Varchar,
        created_at -> Timestamptz,
        /// Last modification timestamp (auto-updated by trigger).
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task items. Rows are removed with their owner.
    items (id) {
        id -> Uuid,
        /// Owning user; `ON DELETE CASCADE`.
        user_id -> Uuid,
        title -> Varchar,
        priority -> Varchar,
        description -> Text,
        due_date -> Date,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(items -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(items, users);
