//! Shared helpers for Diesel repository implementations.
//!
//! Numeric conversions between the domain's unsigned counts and Postgres'
//! signed `BIGINT`, the `LIMIT`/`OFFSET` window for a page, and escaping
//! for `ILIKE` substring filters.

use pagination::PageRequest;

/// `LIMIT` and `OFFSET` values for `page`.
pub(super) fn page_window(page: &PageRequest) -> (i64, i64) {
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (i64::from(page.limit()), offset)
}

/// Convert a Postgres `COUNT(*)` to `u64`, clamping impossible negatives.
pub(super) fn count_to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

/// Build a `%term%` pattern with `ILIKE` metacharacters escaped.
pub(super) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
