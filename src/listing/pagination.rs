//! Page requests with lenient parsing, and the `{total, page, pages, limit}` block returned with
//! every paged list.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::collection::Collection;
use crate::errors::DbError;
use crate::models::from_store;
use crate::query::{Filter, FindOptions, SortSpec, count_docs, find_docs};

/// A resolved page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

fn positive(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok()).filter(|n| *n >= 1)
}

impl PageRequest {
    /// Parses raw `page`/`limit` values. Missing, non-numeric or sub-1 values take the defaults
    /// (page 1, `default_limit`).
    #[must_use]
    pub fn parse(page: Option<&str>, limit: Option<&str>, default_limit: usize) -> Self {
        Self { page: positive(page).unwrap_or(1), limit: positive(limit).unwrap_or(default_limit.max(1)) }
    }

    #[must_use]
    pub fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

impl Pagination {
    #[must_use]
    pub fn new(req: PageRequest, total: usize) -> Self {
        Self { page: req.page, limit: req.limit, total, pages: total.div_ceil(req.limit) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Runs `filter` with `sort` and returns the requested page. The total is counted over every
/// match, independently of the page window.
///
/// # Errors
/// Propagates store failures, including documents that do not decode as `T`.
pub fn fetch_page<T: DeserializeOwned>(
    col: &Collection,
    filter: &Filter,
    sort: Vec<SortSpec>,
    req: PageRequest,
) -> Result<Page<T>, DbError> {
    let total = count_docs(col, filter)?;
    let opts = FindOptions { sort: Some(sort), limit: Some(req.limit), skip: Some(req.skip()) };
    let items = find_docs(col, filter, &opts)?.into_iter().map(from_store::<T>).collect::<Result<Vec<_>, _>>()?;
    Ok(Page { items, pagination: Pagination::new(req, total) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_inputs_fall_back_to_defaults() {
        assert_eq!(PageRequest::parse(None, None, 12), PageRequest { page: 1, limit: 12 });
        assert_eq!(PageRequest::parse(Some("0"), Some("x"), 12), PageRequest { page: 1, limit: 12 });
        assert_eq!(PageRequest::parse(Some("-3"), Some("0"), 10), PageRequest { page: 1, limit: 10 });
        assert_eq!(PageRequest::parse(Some("3"), Some("5"), 12).skip(), 10);
    }

    #[test]
    fn pages_round_up() {
        let p = Pagination::new(PageRequest { page: 2, limit: 5 }, 12);
        assert_eq!((p.total, p.pages), (12, 3));
        assert_eq!(Pagination::new(PageRequest { page: 1, limit: 5 }, 0).pages, 0);
    }
}
