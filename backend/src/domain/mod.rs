//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed entities used by the HTTP and persistence
//! adapters, and the services that implement each use case. Types are
//! immutable once built; invariants are documented on each type.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - User, Item and their value types.
//! - UserService, ItemService, CredentialsLoginService: driving port
//!   implementations.

pub mod access;
pub mod auth;
mod credentials_login_service;
pub mod error;
pub mod item;
mod item_service;
pub mod ports;
pub mod trace_id;
pub mod user;
mod user_service;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::credentials_login_service::CredentialsLoginService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::item::{
    Item, ItemChanges, ItemDescription, ItemFields, ItemId, ItemTitle, ItemValidationError,
    Priority, parse_due_date,
};
pub use self::item_service::{ItemService, item_not_found};
pub use self::trace_id::TraceId;
pub use self::user::{
    EmailAddress, NewUser, NewUserRecord, Password, PasswordDigest, PersonName, Role,
    StoredCredentials, User, UserChanges, UserId, UserProfile, UserValidationError, Username,
};
pub use self::user_service::{UserService, user_not_found};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use taskhub::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
