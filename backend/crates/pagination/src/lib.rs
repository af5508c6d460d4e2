//! Page cursor and pagination envelope primitives for Taskhub list endpoints.
//!
//! List endpoints accept a page size (`limit`) and a one-based page number
//! (`page`). [`Pagination`] validates both and derives the zero-based row
//! offset used by repositories. [`Page`] wraps one page of results together
//! with the total row count so clients can render paging controls.
//!
//! # Examples
//!
//! ```
//! use pagination::{Page, Pagination};
//!
//! let pagination = Pagination::new(10, 3).expect("valid pagination");
//! assert_eq!(pagination.offset(), 20);
//!
//! let page = Page::new(vec!["a", "b"], 22, pagination);
//! assert_eq!(page.total_pages, 3);
//! ```

use serde::{Deserialize, Serialize};

/// Page size applied when the caller does not supply `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 2;
/// Page number applied when the caller does not supply `page`.
pub const DEFAULT_PAGE_NUMBER: u32 = 1;
/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validation failures raised while building a [`Pagination`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// The requested page size is zero, negative, or above [`MAX_PAGE_SIZE`].
    #[error("limit must be between 1 and {max}, got {value}")]
    PageSizeOutOfRange {
        /// Value supplied by the caller.
        value: i64,
        /// Upper bound accepted for page sizes.
        max: u32,
    },
    /// The requested page number is zero or negative.
    #[error("page must be at least 1, got {value}")]
    PageNumberOutOfRange {
        /// Value supplied by the caller.
        value: i64,
    },
}

/// Validated page size and one-based page number.
///
/// ## Invariants
/// - `1 <= page_size <= MAX_PAGE_SIZE`
/// - `page_number >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    page_size: u32,
    page_number: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_number: DEFAULT_PAGE_NUMBER,
        }
    }
}

impl Pagination {
    /// Validate and construct a cursor from raw caller input.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError`] when either value is out of range.
    pub fn new(page_size: i64, page_number: i64) -> Result<Self, PaginationError> {
        let size = u32::try_from(page_size)
            .ok()
            .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
            .ok_or(PaginationError::PageSizeOutOfRange {
                value: page_size,
                max: MAX_PAGE_SIZE,
            })?;
        let number = u32::try_from(page_number)
            .ok()
            .filter(|number| *number >= 1)
            .ok_or(PaginationError::PageNumberOutOfRange { value: page_number })?;

        Ok(Self {
            page_size: size,
            page_number: number,
        })
    }

    /// Build a cursor from optional query parameters, applying the defaults
    /// ([`DEFAULT_PAGE_SIZE`], [`DEFAULT_PAGE_NUMBER`]) for absent values.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError`] when a supplied value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::Pagination;
    ///
    /// let pagination = Pagination::from_query(None, None).expect("defaults");
    /// assert_eq!(pagination.page_size(), 2);
    /// assert_eq!(pagination.page_number(), 1);
    /// assert_eq!(pagination.offset(), 0);
    /// ```
    pub fn from_query(limit: Option<i64>, page: Option<i64>) -> Result<Self, PaginationError> {
        Self::new(
            limit.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)),
            page.unwrap_or(i64::from(DEFAULT_PAGE_NUMBER)),
        )
    }

    /// Number of rows per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// One-based page number.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Zero-based row offset: `(page_number - 1) * page_size`.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number - 1) * u64::from(self.page_size)
    }
}

/// One page of results plus the metadata clients need to page through them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows on this page, in repository order.
    pub data: Vec<T>,
    /// Total number of rows across all pages.
    pub total: u64,
    /// One-based page number this page represents.
    pub page: u32,
    /// Page size used to slice the results.
    pub limit: u32,
    /// Number of pages needed to cover `total` rows.
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Wrap `data` fetched for `pagination` out of `total` rows.
    #[must_use]
    pub fn new(data: Vec<T>, total: u64, pagination: Pagination) -> Self {
        let limit = pagination.page_size();
        Self {
            data,
            total,
            page: pagination.page_number(),
            limit,
            total_pages: total.div_ceil(u64::from(limit)),
        }
    }

    /// Convert every row while keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }

    /// Fallible variant of [`Page::map`]; stops at the first failed row.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        let data = self.data.into_iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            data,
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        })
    }
}
