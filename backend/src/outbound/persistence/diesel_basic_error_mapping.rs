//! Shared Diesel error mapping for the repository adapters.
//!
//! Each repository passes constructors for its own error type, so the
//! classification of Diesel failures lives in one place.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Constructors used by [`map_basic_diesel_error`] for each error class.
pub struct DieselErrorConstructors<Q, C, U> {
    pub query: Q,
    pub connection: C,
    pub conflict: U,
}

/// Map common Diesel error variants into query, connection, or conflict
/// constructors.
///
/// Unique and foreign-key violations are conflicts; closed connections are
/// connection failures; everything else is a query failure.
pub fn map_basic_diesel_error<E, Q, C, U>(
    error: diesel::result::Error,
    ctors: DieselErrorConstructors<Q, C, U>,
) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
    U: Fn(String) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    let DieselErrorConstructors {
        query,
        connection,
        conflict,
    } = ctors;

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(
            kind @ (DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation),
            info,
        ) => {
            let constraint = info.constraint_name().unwrap_or("unnamed constraint");
            let class = if matches!(kind, DatabaseErrorKind::UniqueViolation) {
                "unique"
            } else {
                "foreign key"
            };
            conflict(format!("{class} constraint violated: {constraint}"))
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}
