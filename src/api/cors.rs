//! Cross-origin headers for the browser frontend.

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::errors::AppError;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// A single allowed origin, with credentials.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origin: HeaderValue,
}

impl CorsPolicy {
    /// # Errors
    /// [`AppError::Config`] when `origin` cannot be sent as a header value.
    pub fn new(origin: &str) -> Result<Self, AppError> {
        let origin = HeaderValue::from_str(origin.trim())
            .map_err(|e| AppError::Config(format!("cors origin {origin:?}: {e}")))?;
        Ok(Self { origin })
    }

    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }
}

/// Answers preflights with 204 and decorates every other response.
pub async fn cors(State(policy): State<CorsPolicy>, req: Request, next: Next) -> Response {
    let mut res = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };
    policy.apply(res.headers_mut());
    res
}
