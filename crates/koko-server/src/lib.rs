//! HTTP server for Koko: the chat stream, memory notebook, document upload,
//! spreadsheet loading, and liveness endpoints.

mod error;
mod extract;
mod handlers;
mod state;
mod stream;

pub use error::ApiError;
pub use state::AppState;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

/// Build the application router over shared state.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.uploads.max_bytes;
    Router::new()
        .route("/", get(handlers::admin::home))
        .route("/chat_stream", post(handlers::chat::chat_stream))
        .route(
            "/memories",
            get(handlers::memories::list)
                .post(handlers::memories::save)
                .delete(handlers::memories::clear),
        )
        .route("/upload_doc", post(handlers::upload::upload_doc))
        .route("/load_sheet", post(handlers::sheet::load_sheet))
        .route("/test_db", get(handlers::admin::test_db))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_api_key,
        ))
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
