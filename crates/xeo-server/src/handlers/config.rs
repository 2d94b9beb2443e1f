//! Config API endpoint.
//!
//! Returns project metadata from the site settings and the viewer tuning
//! clients need (base path, poll budget, scroll persistence).

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::error::ServerError;
use crate::handlers::blocking;
use crate::state::AppState;

/// Response for GET /api/config.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigResponse {
    /// Project display name.
    project_name: Option<String>,
    /// Project domain.
    project_domain: Option<String>,
    /// Logo location.
    logo: Option<String>,
    /// `OpenAPI` document location.
    openapi: Option<String>,
    /// `AsyncAPI` document location.
    asyncapi: Option<String>,
    /// False until settings with navigation are available.
    configured: bool,
    /// Viewer tuning.
    viewer: ViewerResponse,
}

/// Viewer tuning for clients.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewerResponse {
    base_path: String,
    poll_interval_ms: u64,
    poll_attempts: u32,
    scroll_debounce_ms: u64,
    spy_band: f64,
    scroll_key_prefix: String,
}

/// Handle GET /api/config.
pub(crate) async fn get_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConfigResponse>, ServerError> {
    let site = Arc::clone(&state.site);
    let snapshot = blocking(move || site.snapshot()).await?;
    let viewer = &state.viewer;

    let mut response = ConfigResponse {
        configured: snapshot.is_configured(),
        viewer: ViewerResponse {
            base_path: state.routes.base_path().to_owned(),
            poll_interval_ms: viewer.poll_interval_ms,
            poll_attempts: viewer.poll_attempts,
            scroll_debounce_ms: viewer.scroll_debounce_ms,
            spy_band: viewer.spy_band,
            scroll_key_prefix: viewer.scroll_key_prefix.clone(),
        },
        ..ConfigResponse::default()
    };

    if let Some(settings) = snapshot.settings() {
        response.project_name.clone_from(&settings.project_name);
        response.project_domain.clone_from(&settings.project_domain);
        response.logo.clone_from(&settings.logo);
        response.openapi.clone_from(&settings.openapi);
        response.asyncapi.clone_from(&settings.asyncapi);
    }

    Ok(Json(response))
}
