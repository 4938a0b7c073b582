//! JSON bodies produced by the HTTP surface.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};

use crate::document::Document;
use crate::errors::AppError;
use crate::query::PageResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> From<&PageResult<T>> for Pagination {
    fn from(p: &PageResult<T>) -> Self {
        Self {
            total_count: p.total_count,
            page: p.page,
            page_size: p.page_size,
            total_pages: p.total_pages,
        }
    }
}

/// Server-side row model payload: `lastRow` tells the grid how many rows exist in total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResponse {
    pub success: bool,
    pub rows: Vec<Value>,
    pub last_row: u64,
    pub pagination: Pagination,
}

impl From<PageResult<Document>> for GridResponse {
    fn from(page: PageResult<Document>) -> Self {
        let pagination = Pagination::from(&page);
        Self {
            success: true,
            last_row: page.total_count,
            rows: page.rows.iter().map(Document::to_row_json).collect(),
            pagination,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorLogPage {
    pub logs: Vec<Value>,
    pub pagination: Pagination,
}

impl From<PageResult<Document>> for ErrorLogPage {
    fn from(page: PageResult<Document>) -> Self {
        let pagination = Pagination::from(&page);
        Self { logs: page.rows.iter().map(Document::to_json).collect(), pagination }
    }
}

/// Overview failure details stay in the error sink.
pub const OVERVIEW_FAILURE: &str = "Failed to fetch overview data";

pub fn grid_failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "success": false, "error": OVERVIEW_FAILURE })))
        .into_response()
}

pub fn server_error(err: &AppError) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "Server error", "error": err.to_string() })))
        .into_response()
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Item not found" }))).into_response()
}

pub fn seed_failure(err: &AppError) -> Response {
    let status = match err {
        AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = json!({ "status": "Error", "message": "Failed to seed data", "error": err.to_string() });
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn grid_response_uses_grid_field_names() {
        let rows = vec![Document::new(doc! {"Brand": "Tesla"})];
        let body = serde_json::to_value(GridResponse::from(PageResult::new(rows, 11, 2, 10))).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["lastRow"], 11);
        assert_eq!(body["pagination"]["totalPages"], 2);
        assert_eq!(body["pagination"]["pageSize"], 10);
        assert_eq!(body["rows"][0]["Brand"], "Tesla");
        assert!(body["rows"][0]["_id"].is_string());
    }

    #[tokio::test]
    async fn grid_failure_body_is_generic() {
        let res = grid_failure();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "success": false, "error": OVERVIEW_FAILURE }));
    }
}
