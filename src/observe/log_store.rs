use bson::{Bson, doc};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

use super::entry::ErrorEntry;
use super::sinks::ErrorSink;
use crate::document::{Document, json_to_bson};
use crate::errors::AppError;
use crate::query::{CmpOp, Order, PageRequest, PageResult, Predicate, SortSpec, fetch_page};
use crate::store::RecordStore;

pub const DEFAULT_LOG_PAGE_SIZE: u64 = 20;
const TIMESTAMP: &str = "timestamp";

/// RFC 3339 instant, or a bare `YYYY-MM-DD` date taken as midnight UTC.
#[must_use]
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

fn bson_instant(t: DateTime<Utc>) -> Bson {
    Bson::DateTime(bson::DateTime::from_millis(t.timestamp_millis()))
}

/// A page of the error log, optionally bounded to an inclusive time window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLogQuery {
    pub page: u64,
    pub page_size: u64,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Default for ErrorLogQuery {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_LOG_PAGE_SIZE, start: None, end: None }
    }
}

impl ErrorLogQuery {
    /// Lenient: bad numbers fall back to defaults and unparseable dates are dropped.
    #[must_use]
    pub fn from_params(
        page: Option<&str>,
        page_size: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Self {
        let p = PageRequest::with_default_size(page, page_size, None, None, DEFAULT_LOG_PAGE_SIZE);
        Self {
            page: p.page,
            page_size: p.page_size,
            start: start.and_then(parse_instant),
            end: end.and_then(parse_instant),
        }
    }

    fn predicate(&self) -> Predicate {
        let mut parts = Vec::new();
        if let Some(s) = self.start {
            parts.push(Predicate::Cmp { field: TIMESTAMP.into(), op: CmpOp::Gte, value: bson_instant(s) });
        }
        if let Some(e) = self.end {
            parts.push(Predicate::Cmp { field: TIMESTAMP.into(), op: CmpOp::Lte, value: bson_instant(e) });
        }
        match parts.len() {
            0 => Predicate::True,
            1 => parts.remove(0),
            _ => Predicate::And(parts),
        }
    }
}

/// Persists reported failures in their own collection, apart from the records being served.
#[derive(Clone)]
pub struct ErrorLogStore {
    store: Arc<dyn RecordStore>,
}

impl std::fmt::Debug for ErrorLogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorLogStore").finish_non_exhaustive()
    }
}

impl ErrorLogStore {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Stores one entry.
    ///
    /// # Errors
    /// Propagates the store failure; [`ErrorSink::record`] swallows it.
    pub fn append(&self, entry: &ErrorEntry) -> Result<(), AppError> {
        let data = doc! {
            "message": entry.message.as_str(),
            "endpoint": entry.endpoint.as_str(),
            "method": entry.method.as_str(),
            "timestamp": bson_instant(entry.timestamp.0),
            "requestData": json_to_bson(&entry.request_data),
            "additional": json_to_bson(&entry.additional),
        };
        self.store.insert_many(vec![Document::new(data)])?;
        Ok(())
    }

    /// Newest first.
    ///
    /// # Errors
    /// Propagates any store failure.
    pub fn list(&self, q: &ErrorLogQuery) -> Result<PageResult<Document>, AppError> {
        let page = PageRequest {
            page: q.page,
            page_size: q.page_size,
            sort: Some(SortSpec { field: TIMESTAMP.into(), order: Order::Desc }),
        };
        fetch_page(self.store.as_ref(), &q.predicate(), &page, None)
    }

    /// Deletes every entry, or only those strictly older than `before`.
    ///
    /// # Errors
    /// Propagates any store failure.
    pub fn clear(&self, before: Option<DateTime<Utc>>) -> Result<u64, AppError> {
        match before {
            None => self.store.clear(),
            Some(t) => self.store.delete_many(&Predicate::Cmp {
                field: TIMESTAMP.into(),
                op: CmpOp::Lt,
                value: bson_instant(t),
            }),
        }
    }
}

impl ErrorSink for ErrorLogStore {
    fn record(&self, entry: &ErrorEntry) {
        if let Err(e) = self.append(entry) {
            log::error!(
                "failed to persist error log ({e}); original error at {} {}: {}",
                entry.method,
                entry.endpoint,
                entry.message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Collection;
    use crate::observe::RequestContext;
    use crate::types::SerializableDateTime;
    use chrono::TimeZone;

    fn entry_at(msg: &str, t: DateTime<Utc>) -> ErrorEntry {
        let mut e = ErrorEntry::new(msg, &RequestContext::new("GET", "/api/data/overview"));
        e.timestamp = SerializableDateTime(t);
        e
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
    }

    fn seeded() -> ErrorLogStore {
        let logs = ErrorLogStore::new(Arc::new(Collection::in_memory("errorlogs")));
        for d in [2, 1, 3] {
            logs.append(&entry_at(&format!("e{d}"), day(d))).unwrap();
        }
        logs
    }

    fn messages(res: &PageResult<Document>) -> Vec<String> {
        res.rows
            .iter()
            .filter_map(|d| d.get("message").and_then(Bson::as_str).map(str::to_string))
            .collect()
    }

    #[test]
    fn lists_newest_first() {
        let res = seeded().list(&ErrorLogQuery::default()).unwrap();
        assert_eq!(messages(&res), vec!["e3", "e2", "e1"]);
        assert_eq!(res.page_size, 20);
    }

    #[test]
    fn window_is_inclusive() {
        let q = ErrorLogQuery { start: Some(day(2)), end: Some(day(3)), ..Default::default() };
        let res = seeded().list(&q).unwrap();
        assert_eq!(messages(&res), vec!["e3", "e2"]);
        assert_eq!(res.total_count, 2);
    }

    #[test]
    fn clear_before_is_strict() {
        let logs = seeded();
        assert_eq!(logs.clear(Some(day(2))).unwrap(), 1);
        assert_eq!(logs.clear(None).unwrap(), 2);
        assert_eq!(logs.list(&ErrorLogQuery::default()).unwrap().total_count, 0);
    }

    #[test]
    fn instants_accept_dates_and_rfc3339() {
        assert_eq!(parse_instant("2024-03-02"), Some(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()));
        assert_eq!(parse_instant("2024-03-02T12:00:00Z"), Some(day(2)));
        assert_eq!(parse_instant("yesterday"), None);
        let q = ErrorLogQuery::from_params(Some("x"), Some("0"), Some("nope"), None);
        assert_eq!(q, ErrorLogQuery::default());
    }
}
