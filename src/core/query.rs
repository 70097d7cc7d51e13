//! Query parameters and pagination utilities

use crate::core::error::{HalError, HalResult};
use indexmap::IndexMap;
use serde::Deserialize;
use std::num::IntErrorKind;

/// Per-page size used when a view does not configure one
pub const DEFAULT_PER_PAGE: usize = 40;

/// Path parameters of a route, in template order (e.g. `{"id": "1"}`)
pub type PathParams = IndexMap<String, String>;

/// Pagination parameters of a collection request
///
/// Values are kept raw so that a malformed `page` or `per_page` can be reported
/// as a bad request instead of being rejected by the extractor.
///
/// # Example
/// ```rust,ignore
/// GET /workouts?page=2
/// GET /workouts?page=1&per_page=10
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// Page number (starts at 1)
    #[serde(default)]
    pub page: Option<String>,

    /// Number of items per page
    #[serde(default)]
    pub per_page: Option<String>,
}

impl PageQuery {
    pub fn new(page: Option<usize>, per_page: Option<usize>) -> Self {
        Self {
            page: page.map(|p| p.to_string()),
            per_page: per_page.map(|p| p.to_string()),
        }
    }

    /// Requested page number, 1 when absent
    pub fn page(&self) -> HalResult<usize> {
        match self.page.as_deref().map(str::trim) {
            None | Some("") => Ok(1),
            Some(raw) => match raw.parse::<usize>() {
                Ok(page) if page >= 1 => Ok(page),
                _ => Err(HalError::bad_request(format!(
                    "page must be a positive integer (got '{}')",
                    raw
                ))),
            },
        }
    }

    /// Whether the client asked for an explicit page size
    pub fn has_per_page(&self) -> bool {
        self.per_page
            .as_deref()
            .is_some_and(|raw| !raw.trim().is_empty())
    }

    /// Effective page size: the requested value (or `default`) capped at `max`
    pub fn per_page(&self, default: usize, max: usize) -> HalResult<usize> {
        let requested = match self.per_page.as_deref().map(str::trim) {
            None | Some("") => default as i64,
            Some(raw) => match raw.parse::<i64>() {
                Ok(requested) => requested,
                // Too large for any page size: clamp like any other oversized request
                Err(err) if *err.kind() == IntErrorKind::PosOverflow => max as i64,
                Err(_) => {
                    return Err(HalError::bad_request(format!(
                        "per_page must be an integer (got '{}')",
                        raw
                    )));
                }
            },
        };
        let effective = requested.min(max as i64);
        if effective < 1 {
            return Err(HalError::bad_request(format!(
                "per_page must be at least 1 (got {})",
                requested
            )));
        }
        Ok(effective as usize)
    }
}

/// One page of a collection, as produced by the storage collaborator
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items of this page, in collection order
    pub items: Vec<T>,

    /// Current page number (starts at 1)
    pub page: usize,

    /// Effective number of items per page
    pub per_page: usize,

    /// Total number of items in the collection
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Build a page from its items and the collection size
    pub fn new(items: Vec<T>, page: usize, per_page: usize, total: usize) -> Self {
        // Ensure per_page is at least 1 to avoid division by zero
        let per_page = per_page.max(1);
        let page = page.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(per_page) };

        Self {
            items,
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Slice a fully materialized, already ordered collection
    pub fn from_slice(all: &[T], page: usize, per_page: usize) -> Self
    where
        T: Clone,
    {
        let per_page = per_page.max(1);
        let start = (page.max(1) - 1).saturating_mul(per_page);
        let items = all.iter().skip(start).take(per_page).cloned().collect();
        Self::new(items, page, per_page, all.len())
    }

    pub fn next_num(&self) -> Option<usize> {
        self.has_next.then_some(self.page + 1)
    }

    pub fn prev_num(&self) -> Option<usize> {
        self.has_prev.then_some(self.page - 1)
    }

    pub fn is_last(&self) -> bool {
        self.page == self.total_pages
    }
}
