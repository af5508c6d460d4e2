//! Task items owned by a single user.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;

/// Maximum allowed length for an item title.
pub const TITLE_MAX: usize = 120;
/// Maximum allowed length for an item description.
pub const DESCRIPTION_MAX: usize = 2000;

/// Validation errors raised while building item values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemValidationError {
    #[error("item id must be a valid UUID")]
    InvalidId,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("priority must be one of: low, medium, high")]
    UnknownPriority,
    #[error("dueDate must be a calendar date formatted as YYYY-MM-DD")]
    InvalidDueDate,
}

impl ItemValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::DescriptionTooLong { .. } => "description",
            Self::UnknownPriority => "priority",
            Self::InvalidDueDate => "dueDate",
        }
    }

    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_uuid",
            Self::EmptyTitle => "empty_title",
            Self::TitleTooLong { .. } => "title_too_long",
            Self::DescriptionTooLong { .. } => "description_too_long",
            Self::UnknownPriority => "unknown_priority",
            Self::InvalidDueDate => "invalid_date",
        }
    }
}

/// Stable item identifier (UUID v7 when generated).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Parse an identifier from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ItemValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| ItemValidationError::InvalidId)
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

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Item urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Lowercase wire and storage form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ItemValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ItemValidationError::UnknownPriority),
        }
    }
}

/// Short label of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Buy milk")]
pub struct ItemTitle(String);

impl ItemTitle {
    /// Validate a title: not blank, at most [`TITLE_MAX`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ItemValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ItemValidationError::EmptyTitle);
        }
        if value.chars().count() > TITLE_MAX {
            return Err(ItemValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(value))
    }
}

/// Free-form item body; may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Semi-skimmed, two litres")]
pub struct ItemDescription(String);

impl ItemDescription {
    /// Validate a description of at most [`DESCRIPTION_MAX`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ItemValidationError> {
        let value = value.into();
        if value.chars().count() > DESCRIPTION_MAX {
            return Err(ItemValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }
        Ok(Self(value))
    }
}

macro_rules! string_conversions {
    ($($name:ident),*) => {
        $(
            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl From<$name> for String {
                fn from(value: $name) -> Self {
                    value.0
                }
            }

            impl TryFrom<String> for $name {
                type Error = ItemValidationError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::new(value)
                }
            }
        )*
    };
}

string_conversions!(ItemTitle, ItemDescription);

/// Parse an ISO 8601 calendar date.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, ItemValidationError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ItemValidationError::InvalidDueDate)
}

/// Caller-supplied item attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub title: ItemTitle,
    pub priority: Priority,
    pub description: ItemDescription,
    pub due_date: NaiveDate,
}

/// Partial overwrite of an item. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemChanges {
    pub title: Option<ItemTitle>,
    pub priority: Option<Priority>,
    pub description: Option<ItemDescription>,
    pub due_date: Option<NaiveDate>,
}

impl ItemChanges {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.priority.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
    }
}

/// A task owned by exactly one user.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use taskhub::domain::{Item, ItemDescription, ItemFields, ItemId, ItemTitle, Priority, UserId};
///
/// let owner = UserId::generate();
/// let fields = ItemFields {
///     title: ItemTitle::new("Buy milk").expect("valid title"),
///     priority: Priority::High,
///     description: ItemDescription::default(),
///     due_date: NaiveDate::from_ymd_opt(2025, 1, 31).expect("valid date"),
/// };
/// let item = Item::new(ItemId::generate(), owner, fields);
/// assert_eq!(item.owner(), &owner);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    id: ItemId,
    #[schema(value_type = String, format = Uuid)]
    user_id: UserId,
    title: ItemTitle,
    priority: Priority,
    description: ItemDescription,
    #[schema(value_type = String, format = Date, example = "2025-01-31")]
    due_date: NaiveDate,
}

impl Item {
    /// Build an item from validated components.
    pub fn new(id: ItemId, owner: UserId, fields: ItemFields) -> Self {
        let ItemFields {
            title,
            priority,
            description,
            due_date,
        } = fields;
        Self {
            id,
            user_id: owner,
            title,
            priority,
            description,
            due_date,
        }
    }

    /// Item identifier.
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Owning user.
    pub fn owner(&self) -> &UserId {
        &self.user_id
    }

    /// Short label.
    pub fn title(&self) -> &ItemTitle {
        &self.title
    }

    /// Urgency.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Free-form body.
    pub fn description(&self) -> &ItemDescription {
        &self.description
    }

    /// Calendar date the item is due.
    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }
}
