//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every field-level failure becomes a `400 invalid_request` whose details
//! carry the wire name of the field and a stable code.

use pagination::{Pagination, PaginationError};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::{
    Error, ItemId, ItemValidationError, LoginValidationError, UserId, UserValidationError,
};

/// Domain validation failure that can be reported against a single field.
pub(crate) trait FieldFailure: std::fmt::Display {
    fn field(&self) -> &'static str;
    fn code(&self) -> &'static str;
}

impl FieldFailure for UserValidationError {
    fn field(&self) -> &'static str {
        UserValidationError::field(self)
    }

    fn code(&self) -> &'static str {
        UserValidationError::code(self)
    }
}

impl FieldFailure for ItemValidationError {
    fn field(&self) -> &'static str {
        ItemValidationError::field(self)
    }

    fn code(&self) -> &'static str {
        ItemValidationError::code(self)
    }
}

impl FieldFailure for LoginValidationError {
    fn field(&self) -> &'static str {
        LoginValidationError::field(self)
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "empty_username",
            Self::EmptyPassword => "empty_password",
        }
    }
}

impl FieldFailure for PaginationError {
    fn field(&self) -> &'static str {
        match self {
            Self::PageSizeOutOfRange { .. } => "limit",
            Self::PageNumberOutOfRange { .. } => "page",
        }
    }

    fn code(&self) -> &'static str {
        "out_of_range"
    }
}

/// Report `failure` as a `400` with `{ field, code }` details.
pub(crate) fn field_error(failure: &impl FieldFailure) -> Error {
    Error::invalid_request(failure.to_string()).with_details(json!({
        "field": failure.field(),
        "code": failure.code(),
    }))
}

/// Parse a `{id}` path segment naming a user.
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| id_error(&err, raw))
}

/// Parse a `{id}` path segment naming an item.
pub(crate) fn parse_item_id(raw: &str) -> Result<ItemId, Error> {
    ItemId::new(raw).map_err(|err| id_error(&err, raw))
}

fn id_error(failure: &impl FieldFailure, raw: &str) -> Error {
    Error::invalid_request(failure.to_string()).with_details(json!({
        "field": failure.field(),
        "value": raw,
        "code": failure.code(),
    }))
}

/// `limit` and `page` query parameters accepted by list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page size, 1 to 100. Defaults to 2.
    #[param(minimum = 1, maximum = 100, example = 2)]
    pub limit: Option<i64>,
    /// One-based page number. Defaults to 1.
    #[param(minimum = 1, example = 1)]
    pub page: Option<i64>,
}

impl PageQuery {
    /// Apply defaults and bounds.
    pub(crate) fn pagination(&self) -> Result<Pagination, Error> {
        Pagination::from_query(self.limit, self.page).map_err(|err| field_error(&err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case(None, None, 2, 1)]
    #[case(Some(10), Some(3), 10, 3)]
    #[case(Some(100), None, 100, 1)]
    fn page_query_applies_defaults(
        #[case] limit: Option<i64>,
        #[case] page: Option<i64>,
        #[case] size: u32,
        #[case] number: u32,
    ) {
        let pagination = PageQuery { limit, page }.pagination().expect("valid query");
        assert_eq!(pagination.page_size(), size);
        assert_eq!(pagination.page_number(), number);
    }

    #[rstest]
    #[case(Some(0), None, "limit")]
    #[case(Some(101), None, "limit")]
    #[case(None, Some(0), "page")]
    #[case(None, Some(-4), "page")]
    fn page_query_rejects_out_of_range_values(
        #[case] limit: Option<i64>,
        #[case] page: Option<i64>,
        #[case] field: &str,
    ) {
        let err = PageQuery { limit, page }.pagination().expect_err("rejected");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details.get("field").and_then(Value::as_str), Some(field));
        assert_eq!(details.get("code").and_then(Value::as_str), Some("out_of_range"));
    }

    #[rstest]
    fn malformed_ids_echo_the_value() {
        let err = parse_item_id("nope").expect_err("rejected");

        let details = err.details().expect("details");
        assert_eq!(details.get("value").and_then(Value::as_str), Some("nope"));
        assert_eq!(details.get("code").and_then(Value::as_str), Some("invalid_uuid"));
    }

    #[rstest]
    fn field_errors_use_the_wire_field_name() {
        let err = field_error(&ItemValidationError::InvalidDueDate);

        assert_eq!(
            err.details().and_then(|d| d.get("field")).and_then(Value::as_str),
            Some("dueDate")
        );
    }
}
