//! OpenAPI schema definitions for paged responses.
//!
//! The `pagination` crate stays free of utoipa, so the page envelopes the
//! list endpoints return are described here for each entity type.

use utoipa::ToSchema;

use crate::domain::{Item, User};

/// OpenAPI schema for `Page<User>`.
#[derive(ToSchema)]
#[schema(as = UserPage, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct UserPageSchema {
    /// Users on this page, oldest first.
    data: Vec<User>,
    /// Total number of users.
    #[schema(example = 5)]
    total: u64,
    /// One-based page number.
    #[schema(example = 1)]
    page: u32,
    /// Page size used for this page.
    #[schema(example = 2)]
    limit: u32,
    /// Number of pages at this size.
    #[schema(example = 3)]
    total_pages: u64,
}

/// OpenAPI schema for `Page<Item>`.
#[derive(ToSchema)]
#[schema(as = ItemPage, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ItemPageSchema {
    /// The caller's items on this page, oldest first.
    data: Vec<Item>,
    /// Total number of items owned by the caller.
    #[schema(example = 5)]
    total: u64,
    /// One-based page number.
    #[schema(example = 1)]
    page: u32,
    /// Page size used for this page.
    #[schema(example = 2)]
    limit: u32,
    /// Number of pages at this size.
    #[schema(example = 3)]
    total_pages: u64,
}
