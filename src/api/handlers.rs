use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::sync::Arc;

use super::response::{
    ErrorLogPage, GridResponse, grid_failure, not_found, seed_failure, server_error,
};
use super::state::AppState;
use crate::errors::AppError;
use crate::observe::{ErrorLogQuery, parse_instant};
use crate::query::OverviewParams;

/// Runs store work off the async workers; log appends may fsync.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Storage(format!("worker task failed: {e}")))?
}

/// Raw query pairs; axum only rejects these for a query string it cannot decode at all.
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Query parameters where the first occurrence of a repeated key wins. A query that still
/// does not fit `T` falls back to `T::default()`.
fn lenient_query<T: DeserializeOwned + Default>(raw: QueryPairs) -> T {
    let pairs = match raw {
        Ok(Query(pairs)) => pairs,
        Err(e) => {
            log::debug!("query string rejected, using defaults: {e}");
            return T::default();
        }
    };
    let mut map = Map::new();
    for (k, v) in pairs {
        map.entry(k).or_insert(Value::String(v));
    }
    serde_json::from_value(Value::Object(map)).unwrap_or_else(|e| {
        log::debug!("query parameters ignored, using defaults: {e}");
        T::default()
    })
}

pub async fn overview(State(state): State<Arc<AppState>>, raw: QueryPairs) -> Response {
    let params: OverviewParams = lenient_query(raw);
    let svc = state.vehicles.clone();
    match blocking(move || svc.overview(&params)).await {
        Ok(page) => Json(GridResponse::from(page)).into_response(),
        Err(_) => grid_failure(),
    }
}

pub async fn list(State(state): State<Arc<AppState>>, raw: QueryPairs) -> Response {
    let params: OverviewParams = lenient_query(raw);
    let svc = state.vehicles.clone();
    match blocking(move || svc.list(&params)).await {
        Ok(docs) => Json(docs.iter().map(crate::document::Document::to_json).collect::<Vec<_>>())
            .into_response(),
        Err(e) => server_error(&e),
    }
}

pub async fn get_one(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let svc = state.vehicles.clone();
    match blocking(move || svc.get(&id)).await {
        Ok(Some(doc)) => Json(doc.to_json()).into_response(),
        Ok(None) => not_found(),
        Err(e) => server_error(&e),
    }
}

pub async fn delete_one(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let svc = state.vehicles.clone();
    match blocking(move || svc.delete(&id)).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found(),
        Err(e) => server_error(&e),
    }
}

pub async fn seed(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(e) => return seed_failure(&AppError::InvalidInput(e.body_text())),
    };
    let Value::Array(records) = body else {
        return seed_failure(&AppError::InvalidInput("expected a JSON array of records".into()));
    };
    let svc = state.vehicles.clone();
    match blocking(move || svc.seed(&records)).await {
        Ok(count) => Json(json!({ "status": "Seeded", "count": count })).into_response(),
        Err(e) => seed_failure(&e),
    }
}

pub async fn count(State(state): State<Arc<AppState>>) -> Response {
    let svc = state.vehicles.clone();
    match blocking(move || svc.count()).await {
        Ok(count) => Json(json!({ "count": count })).into_response(),
        Err(e) => server_error(&e),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorLogParams {
    page: Option<String>,
    page_size: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

pub async fn error_logs(State(state): State<Arc<AppState>>, raw: QueryPairs) -> Response {
    let p: ErrorLogParams = lenient_query(raw);
    let q = ErrorLogQuery::from_params(
        p.page.as_deref(),
        p.page_size.as_deref(),
        p.start_date.as_deref(),
        p.end_date.as_deref(),
    );
    let logs = state.error_logs.clone();
    match blocking(move || logs.list(&q)).await {
        Ok(page) => Json(ErrorLogPage::from(page)).into_response(),
        Err(e) => {
            // not through the sink: it may write to this same failing store
            log::error!("GET /api/error-logs: {e}");
            server_error(&e)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClearParams {
    before: Option<String>,
}

pub async fn clear_error_logs(State(state): State<Arc<AppState>>, raw: QueryPairs) -> Response {
    let p: ClearParams = lenient_query(raw);
    let before = match p.before.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => match parse_instant(raw) {
            Some(t) => Some(t),
            None => {
                let body = json!({ "success": false, "error": format!("invalid date: {raw}") });
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
        },
    };
    let logs = state.error_logs.clone();
    match blocking(move || logs.clear(before)).await {
        Ok(deleted) => Json(json!({
            "success": true,
            "deleted": deleted,
            "message": format!("Successfully deleted {deleted} error logs"),
        }))
        .into_response(),
        Err(e) => {
            let body = json!({ "success": false, "error": e.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
