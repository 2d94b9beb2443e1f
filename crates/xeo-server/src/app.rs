//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/api/config", get(handlers::config::get_config))
        .route("/api/navigation", get(handlers::navigation::get_navigation))
        .route("/api/pages/", get(handlers::pages::get_root_page))
        .route("/api/pages/{*path}", get(handlers::pages::get_page))
        .route(
            "/api/scroll/{*path}",
            get(handlers::scroll::get_scroll).put(handlers::scroll::put_scroll),
        )
        .route("/api/reload", post(handlers::reload::reload))
        .route("/content/{*path}", get(handlers::content::get_content));

    let mut router = api_routes.with_state(state);
    for layer in security::layers() {
        router = router.layer(layer);
    }
    router
}
