//! Request-level vehicle operations.
//!
//! Every storage failure is reported to the error sink before it is returned, so the HTTP and
//! CLI front ends only have to shape the response.

use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::document::Document;
use crate::errors::AppError;
use crate::observe::{ErrorEntry, ErrorSink, RequestContext};
use crate::query::{
    ComposedQuery, FindOptions, OverviewParams, PageResult, compose_list, compose_overview,
    fetch_page,
};
use crate::store::RecordStore;
use crate::types::RecordId;
use crate::vehicle::{OVERVIEW_PROJECTION, record_from_json};

/// Cap on the legacy full-record listing.
pub const LIST_LIMIT: usize = 100;

#[derive(Clone)]
pub struct VehicleService {
    store: Arc<dyn RecordStore>,
    sink: Arc<dyn ErrorSink>,
}

impl std::fmt::Debug for VehicleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VehicleService").finish_non_exhaustive()
    }
}

impl VehicleService {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, sink: Arc<dyn ErrorSink>) -> Self {
        Self { store, sink }
    }

    #[must_use]
    pub fn sink(&self) -> &Arc<dyn ErrorSink> {
        &self.sink
    }

    /// One grid page: compose, count, fetch the projected window.
    ///
    /// A malformed filter set is reported and recovered from; only storage failures are errors.
    ///
    /// # Errors
    /// Returns the store failure after reporting it.
    pub fn overview(&self, params: &OverviewParams) -> Result<PageResult<Document>, AppError> {
        let ctx = RequestContext::new("GET", "/api/data/overview").with_data(params_json(params));
        let ComposedQuery { predicate, page, filter_set_error } = compose_overview(params);
        if let Some(e) = filter_set_error {
            self.sink.record(&ErrorEntry::from_error(&e, &ctx).with_additional(json!({
                "errorType": "JSON Parsing",
                "filtersJson": params.filters_json,
            })));
        }
        log::debug!("overview: predicate={predicate:?} page={} size={}", page.page, page.page_size);
        let projection = &OVERVIEW_PROJECTION[..];
        fetch_page(self.store.as_ref(), &predicate, &page, Some(projection)).inspect_err(|e| {
            self.sink.record(&ErrorEntry::from_error(e, &ctx).with_additional(json!({
                "query": serde_json::to_value(&predicate).unwrap_or(Value::Null),
                "projection": projection,
                "skip": page.skip(),
                "limit": page.page_size,
            })));
        })
    }

    /// Full records matching search plus the single legacy filter, natural order, capped.
    ///
    /// # Errors
    /// Returns the store failure after reporting it.
    pub fn list(&self, params: &OverviewParams) -> Result<Vec<Document>, AppError> {
        let ctx = RequestContext::new("GET", "/api/data").with_data(params_json(params));
        let predicate = compose_list(params);
        let opts = FindOptions { limit: Some(LIST_LIMIT), ..Default::default() };
        self.store.find(&predicate, &opts).inspect_err(|e| self.report(e, &ctx))
    }

    /// `Ok(None)` when the id is unknown or not a valid identifier.
    ///
    /// # Errors
    /// Returns the store failure after reporting it.
    pub fn get(&self, raw_id: &str) -> Result<Option<Document>, AppError> {
        let Ok(id) = raw_id.parse::<RecordId>() else {
            log::debug!("get: {raw_id:?} is not a record id");
            return Ok(None);
        };
        let ctx = RequestContext::new("GET", &format!("/api/data/{raw_id}"));
        self.store.find_by_id(&id).inspect_err(|e| self.report(e, &ctx))
    }

    /// `Ok(false)` when nothing was deleted.
    ///
    /// # Errors
    /// Returns the store failure after reporting it.
    pub fn delete(&self, raw_id: &str) -> Result<bool, AppError> {
        let Ok(id) = raw_id.parse::<RecordId>() else {
            log::debug!("delete: {raw_id:?} is not a record id");
            return Ok(false);
        };
        let ctx = RequestContext::new("DELETE", &format!("/api/data/{raw_id}"));
        let deleted = self.store.delete_by_id(&id).inspect_err(|e| self.report(e, &ctx))?;
        if deleted {
            log::info!("deleted record {id}");
        }
        Ok(deleted)
    }

    /// Inserts a batch of JSON records, coercing schema fields. All or nothing.
    ///
    /// # Errors
    /// [`AppError::InvalidInput`] when an element is not an object; otherwise the store failure.
    /// Both are reported.
    pub fn seed(&self, records: &[Value]) -> Result<usize, AppError> {
        let ctx = RequestContext::new("POST", "/api/seed")
            .with_data(json!({ "records": records.len() }));
        let docs = records
            .iter()
            .enumerate()
            .map(|(i, v)| match v {
                Value::Object(obj) => Ok(Document::new(record_from_json(obj))),
                _ => Err(AppError::InvalidInput(format!("record {i} is not an object"))),
            })
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| self.report(e, &ctx))?;
        let n = self.store.insert_many(docs).inspect_err(|e| self.report(e, &ctx))?;
        log::info!("seeded {n} records");
        Ok(n)
    }

    /// Drops every record; returns how many were removed.
    ///
    /// # Errors
    /// Returns the store failure after reporting it.
    pub fn clear(&self) -> Result<u64, AppError> {
        let ctx = RequestContext::new("DELETE", "/api/data");
        self.store.clear().inspect_err(|e| self.report(e, &ctx))
    }

    /// # Errors
    /// Returns the store failure after reporting it.
    pub fn count(&self) -> Result<u64, AppError> {
        let ctx = RequestContext::new("GET", "/api/count");
        self.store.count(&crate::query::Predicate::True).inspect_err(|e| self.report(e, &ctx))
    }

    fn report(&self, err: &AppError, ctx: &RequestContext) {
        self.sink.record(&ErrorEntry::from_error(err, ctx));
    }
}

fn params_json(params: &OverviewParams) -> Value {
    match serde_json::to_value(params) {
        // absent parameters are noise in stored logs
        Ok(Value::Object(m)) => {
            Value::Object(m.into_iter().filter(|(_, v)| !v.is_null()).collect::<Map<_, _>>())
        }
        _ => Value::Null,
    }
}
