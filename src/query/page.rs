use serde::Serialize;

use super::types::{FindOptions, Order, Predicate, SortSpec};
use crate::document::Document;
use crate::errors::AppError;
use crate::store::RecordStore;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Leading-integer parse: optional whitespace, optional sign, then digits; trailing text is
/// ignored (`"12abc"` is 12, `"2.7"` is 2). Returns `None` when no digits lead the input or
/// the value does not fit.
#[must_use]
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let t = raw.trim_start();
    let (neg, rest) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let n: i64 = rest[..digits_len].parse().ok()?;
    Some(if neg { -n } else { n })
}

/// Positive integer from an optional query parameter, else `default`.
#[must_use]
pub fn positive_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(parse_leading_int)
        .and_then(|n| u64::try_from(n).ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
    pub sort: Option<SortSpec>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, page_size: DEFAULT_PAGE_SIZE, sort: None }
    }
}

impl PageRequest {
    /// Coerces raw (possibly absent or garbage) parameters; never fails.
    #[must_use]
    pub fn from_params(
        page: Option<&str>,
        page_size: Option<&str>,
        sort_field: Option<&str>,
        sort_order: Option<&str>,
    ) -> Self {
        Self::with_default_size(page, page_size, sort_field, sort_order, DEFAULT_PAGE_SIZE)
    }

    #[must_use]
    pub fn with_default_size(
        page: Option<&str>,
        page_size: Option<&str>,
        sort_field: Option<&str>,
        sort_order: Option<&str>,
        default_size: u64,
    ) -> Self {
        let sort = sort_field
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(|f| SortSpec { field: f.to_string(), order: Order::from_param(sort_order) });
        Self {
            page: positive_or(page, DEFAULT_PAGE),
            page_size: positive_or(page_size, default_size),
            sort,
        }
    }

    #[must_use]
    pub const fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Store read options for this page window.
    #[must_use]
    pub fn find_options(&self, projection: Option<&[&str]>) -> FindOptions {
        FindOptions {
            projection: projection.map(|p| p.iter().map(|s| (*s).to_string()).collect()),
            sort: self.sort.clone().map(|s| vec![s]),
            skip: Some(usize::try_from(self.skip()).unwrap_or(usize::MAX)),
            limit: Some(usize::try_from(self.page_size).unwrap_or(usize::MAX)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub rows: Vec<T>,
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

#[must_use]
pub const fn total_pages(total_count: u64, page_size: u64) -> u64 {
    if page_size == 0 { 0 } else { total_count.div_ceil(page_size) }
}

impl<T> PageResult<T> {
    #[must_use]
    pub const fn new(rows: Vec<T>, total_count: u64, page: u64, page_size: u64) -> Self {
        Self { rows, total_count, page, page_size, total_pages: total_pages(total_count, page_size) }
    }

    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PageResult<U> {
        PageResult {
            rows: self.rows.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

/// Counts every match, then fetches the requested window.
///
/// The two reads are independent: a concurrent write between them can make `total_count`
/// disagree with `rows`.
///
/// # Errors
/// Propagates any store failure from either read.
pub fn fetch_page(
    store: &dyn RecordStore,
    predicate: &Predicate,
    page: &PageRequest,
    projection: Option<&[&str]>,
) -> Result<PageResult<Document>, AppError> {
    let total_count = store.count(predicate)?;
    let mut rows = store.find(predicate, &page.find_options(projection))?;
    rows.truncate(usize::try_from(page.page_size).unwrap_or(usize::MAX));
    Ok(PageResult::new(rows, total_count, page.page, page.page_size))
}
