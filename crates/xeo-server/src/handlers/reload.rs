//! Reload API endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::error::ServerError;
use crate::handlers::blocking;
use crate::state::AppState;

/// Response for POST /api/reload.
#[derive(Serialize)]
pub(crate) struct ReloadResponse {
    /// Navigation entries after the reload.
    items: usize,
}

/// Handle POST /api/reload: drop cached settings and rebuild navigation.
pub(crate) async fn reload(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, ServerError> {
    state.site.invalidate();
    let items = blocking(move || state.site.snapshot().tree().len()).await?;
    tracing::info!(items, "Site reloaded");
    Ok(Json(ReloadResponse { items }))
}
