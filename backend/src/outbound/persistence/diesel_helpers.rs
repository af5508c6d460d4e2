//! Shared helpers for Diesel repository implementations.

use pagination::Pagination;

/// Convert a pagination cursor into SQL `LIMIT` and `OFFSET` values.
pub(crate) fn limit_and_offset(
    pagination: &Pagination,
) -> Result<(i64, i64), diesel::result::Error> {
    let offset = i64::try_from(pagination.offset()).map_err(|_| {
        diesel::result::Error::QueryBuilderError("page offset exceeds i64::MAX".into())
    })?;
    Ok((i64::from(pagination.page_size()), offset))
}

/// Convert a `COUNT(*)` result; Postgres never returns a negative count.
pub(crate) fn to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

/// Convert the affected-row count returned by `execute`.
pub(crate) fn to_affected(rows: usize) -> u64 {
    u64::try_from(rows).unwrap_or(u64::MAX)
}
