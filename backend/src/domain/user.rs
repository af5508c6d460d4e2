//! User identity model.
//!
//! Values are validated once at construction and immutable afterwards. The
//! password only ever leaves this module as a [`PasswordDigest`]; a [`User`]
//! never carries one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use zeroize::Zeroizing;

/// Maximum allowed length for a person's name.
pub const NAME_MAX: usize = 64;
/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;
/// Maximum allowed length for an email address.
pub const EMAIL_MAX: usize = 254;
/// Minimum allowed length for a password.
pub const PASSWORD_MIN: usize = 8;

/// Validation errors raised while building user values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier is not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The name is blank.
    #[error("name must not be empty")]
    EmptyName,
    /// The name exceeds [`NAME_MAX`].
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    /// The username length is outside [`USERNAME_MIN`]..=[`USERNAME_MAX`].
    #[error("username must be between {min} and {max} characters")]
    UsernameLength { min: usize, max: usize },
    /// The username contains characters other than ASCII letters, digits and `_`.
    #[error("username may only contain letters, numbers, or underscores")]
    UsernameInvalidCharacters,
    /// The email exceeds [`EMAIL_MAX`].
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    /// The email is not shaped like `local@domain.tld`.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// The password is shorter than [`PASSWORD_MIN`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    /// The role is not one of the known roles.
    #[error("role must be one of: admin, user")]
    UnknownRole,
}

impl UserValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::UsernameLength { .. } | Self::UsernameInvalidCharacters => "username",
            Self::EmailTooLong { .. } | Self::InvalidEmail => "email",
            Self::PasswordTooShort { .. } => "password",
            Self::UnknownRole => "role",
        }
    }

    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_uuid",
            Self::EmptyName => "empty_name",
            Self::NameTooLong { .. } => "name_too_long",
            Self::UsernameLength { .. } => "invalid_username_length",
            Self::UsernameInvalidCharacters => "invalid_username_characters",
            Self::EmailTooLong { .. } => "email_too_long",
            Self::InvalidEmail => "invalid_email",
            Self::PasswordTooShort { .. } => "password_too_short",
            Self::UnknownRole => "unknown_role",
        }
    }
}

/// Stable user identifier.
///
/// Fresh identifiers are UUID v7, so ordering by id follows creation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a fresh time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role assigned to a user; drives the access policy.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May act on any user.
    Admin,
    /// May only act on itself.
    #[default]
    User,
}

impl Role {
    /// Lowercase wire and storage form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident, $validate:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(try_from = "String", into = "String")]
        #[schema(value_type = String)]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the value.
            pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
                let value = value.into();
                $validate(&value)?;
                Ok(Self(value))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = UserValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

string_newtype!(
    /// Person's name as shown to other users.
    PersonName,
    validate_name
);
string_newtype!(
    /// Unique login handle.
    Username,
    validate_username
);
string_newtype!(
    /// Unique contact address.
    EmailAddress,
    validate_email
);

fn validate_name(value: &str) -> Result<(), UserValidationError> {
    if value.trim().is_empty() {
        return Err(UserValidationError::EmptyName);
    }
    if value.chars().count() > NAME_MAX {
        return Err(UserValidationError::NameTooLong { max: NAME_MAX });
    }
    Ok(())
}

fn validate_username(value: &str) -> Result<(), UserValidationError> {
    let length = value.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
        return Err(UserValidationError::UsernameLength {
            min: USERNAME_MIN,
            max: USERNAME_MAX,
        });
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(UserValidationError::UsernameInvalidCharacters);
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), UserValidationError> {
    if value.chars().count() > EMAIL_MAX {
        return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
    }
    if value.chars().any(char::is_whitespace) {
        return Err(UserValidationError::InvalidEmail);
    }
    let Some((local, domain)) = value.split_once('@') else {
        return Err(UserValidationError::InvalidEmail);
    };
    let domain_ok = domain.contains('.')
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.');
    if local.is_empty() || !domain_ok {
        return Err(UserValidationError::InvalidEmail);
    }
    Ok(())
}

/// Plain-text password held only long enough to hash or verify it.
///
/// The buffer is zeroed on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate the minimum length and wrap the secret.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = Zeroizing::new(value.into());
        if value.chars().count() < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(value))
    }

    /// Borrow the secret for hashing.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Self-describing password hash (PHC string).
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap an encoded hash.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash as stored.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(***)")
    }
}

/// Public profile attributes shared by new and persisted users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Person's name.
    pub name: PersonName,
    /// Unique login handle.
    pub username: Username,
    /// Unique contact address.
    pub email: EmailAddress,
}

/// Validated request to create a user.
///
/// The confirmation is kept verbatim; services decide whether it matches.
#[derive(Debug, Clone)]
pub struct NewUser {
    profile: UserProfile,
    password: Password,
    password_confirmation: Zeroizing<String>,
    role: Role,
}

impl NewUser {
    /// Bundle the validated attributes.
    pub fn new(
        profile: UserProfile,
        password: Password,
        password_confirmation: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            profile,
            password,
            password_confirmation: Zeroizing::new(password_confirmation.into()),
            role,
        }
    }

    /// Requested profile.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Requested password.
    pub fn password(&self) -> &Password {
        &self.password
    }

    /// Requested role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the confirmation equals the password.
    pub fn confirmation_matches(&self) -> bool {
        self.password.expose() == self.password_confirmation.as_str()
    }

    /// Replace the requested role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Row written by [`crate::domain::ports::UserRepository::create`].
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    /// Fresh identifier.
    pub id: UserId,
    /// Profile attributes.
    pub profile: UserProfile,
    /// Assigned role.
    pub role: Role,
    /// Hashed password.
    pub password_digest: PasswordDigest,
}

/// Credentials needed to authenticate a login attempt.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    /// Owner of the credentials.
    pub user_id: UserId,
    /// Role to place in the session.
    pub role: Role,
    /// Hash to verify against.
    pub password_digest: PasswordDigest,
}

/// Partial overwrite of a user's profile. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    /// New name.
    pub name: Option<PersonName>,
    /// New username.
    pub username: Option<Username>,
    /// New email.
    pub email: Option<EmailAddress>,
}

impl UserChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.username.is_none() && self.email.is_none()
    }
}

/// Application user as returned to clients.
///
/// ## Invariants
/// - Every field has passed validation.
/// - No password material is held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    #[schema(value_type = String, example = "018f2a4c-6b1e-7c3d-9a8b-1234567890ab")]
    id: UserId,
    #[schema(value_type = String, example = "Ada Lovelace")]
    name: PersonName,
    #[schema(value_type = String, example = "ada_l")]
    username: Username,
    #[schema(value_type = String, example = "ada@example.com")]
    email: EmailAddress,
    role: Role,
}

impl User {
    /// Build a user from validated components.
    pub fn new(id: UserId, profile: UserProfile, role: Role) -> Self {
        let UserProfile {
            name,
            username,
            email,
        } = profile;
        Self {
            id,
            name,
            username,
            email,
            role,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Person's name.
    pub fn name(&self) -> &PersonName {
        &self.name
    }

    /// Login handle.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Contact address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Assigned role.
    pub fn role(&self) -> Role {
        self.role
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
struct UserDto {
    id: String,
    name: String,
    username: String,
    email: String,
    role: Role,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            name,
            username,
            email,
            role,
        } = value;
        Self {
            id: id.to_string(),
            name: name.into(),
            username: username.into(),
            email: email.into(),
            role,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        let UserDto {
            id,
            name,
            username,
            email,
            role,
        } = value;
        let profile = UserProfile {
            name: PersonName::new(name)?,
            username: Username::new(username)?,
            email: EmailAddress::new(email)?,
        };
        Ok(Self::new(UserId::new(id)?, profile, role))
    }
}
