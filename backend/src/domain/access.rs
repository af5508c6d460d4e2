//! Access policy shared by the route gate and the services.
//!
//! Two questions are answered here: may this caller use the operation at all,
//! and which user id does the operation actually act upon.

use serde::{Deserialize, Serialize};

use super::{Error, Role, UserId};

/// Message returned when a role is not allowed to run an operation.
pub const PERMISSION_DENIED_MESSAGE: &str =
    "Permission denied! Role not assigned for current operation";

/// Authenticated identity taken from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Account the request acts for.
    pub user_id: UserId,
    /// Role held by that account in the user store.
    pub role: Role,
}

impl Caller {
    /// Pair an account with its role.
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether the caller holds [`Role::Admin`].
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Allow-list of roles for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedRoles(Vec<Role>);

impl AllowedRoles {
    /// Build an allow-list; duplicates are harmless.
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self(roles.into_iter().collect())
    }

    /// Only administrators.
    pub fn admin_only() -> Self {
        Self::new([Role::Admin])
    }

    /// Whether `role` appears in the list.
    pub fn permits(&self, role: Role) -> bool {
        self.0.contains(&role)
    }
}

/// Reject callers whose role is not on the allow-list.
///
/// # Examples
/// ```
/// use taskhub::domain::access::{authorize, AllowedRoles, Caller};
/// use taskhub::domain::{ErrorCode, Role, UserId};
///
/// let caller = Caller::new(UserId::generate(), Role::User);
/// let err = authorize(&caller, &AllowedRoles::admin_only()).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::Forbidden);
/// ```
pub fn authorize(caller: &Caller, allowed: &AllowedRoles) -> Result<(), Error> {
    if allowed.permits(caller.role) {
        Ok(())
    } else {
        Err(Error::forbidden(PERMISSION_DENIED_MESSAGE))
    }
}

/// Effective user id for a user-targeted operation.
///
/// Administrators act on the requested id; everyone else acts on themselves
/// regardless of what was requested.
pub fn resolve_user_target(caller: &Caller, requested: UserId) -> UserId {
    if caller.is_admin() {
        requested
    } else {
        caller.user_id
    }
}
