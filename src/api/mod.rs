//! HTTP surface.
//!
//! ## Routes
//!
//! - `GET /api/data/overview`: one grid page (search, filters, paging, sort).
//! - `GET /api/data`: full records, search plus a single filter, at most 100.
//! - `GET /api/data/:id`, `DELETE /api/data/:id`
//! - `POST /api/seed`, `GET /api/count`
//! - `GET /api/error-logs`, `DELETE /api/error-logs`

mod cors;
mod handlers;
mod response;
mod state;

pub use cors::CorsPolicy;
pub use response::{ErrorLogPage, GridResponse, Pagination};
pub use state::AppState;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

/// Builds the router; CORS wraps every route, including unknown ones.
pub fn router(state: Arc<AppState>, cors: CorsPolicy) -> Router {
    Router::new()
        .route("/api/data/overview", get(handlers::overview))
        .route("/api/data", get(handlers::list))
        .route("/api/data/:id", get(handlers::get_one).delete(handlers::delete_one))
        .route("/api/seed", post(handlers::seed))
        .route("/api/count", get(handlers::count))
        .route(
            "/api/error-logs",
            get(handlers::error_logs).delete(handlers::clear_error_logs),
        )
        .with_state(state)
        .layer(axum::middleware::from_fn_with_state(cors, cors::cors))
}

/// Serves until the listener fails.
///
/// # Errors
/// Bind or accept failures.
pub async fn serve(state: Arc<AppState>, cors: CorsPolicy, addr: &str) -> Result<(), std::io::Error> {
    let app = router(state, cors);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}
