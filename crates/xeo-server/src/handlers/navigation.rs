//! Navigation API endpoint.
//!
//! Returns the normalized navigation groups for the sidebar.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use xeo_site::NavGroup;

use crate::error::ServerError;
use crate::handlers::blocking;
use crate::state::AppState;

/// Response for GET /api/navigation.
#[derive(Serialize)]
pub(crate) struct NavigationResponse {
    /// Navigation groups, empty when unconfigured.
    groups: Vec<NavGroup>,
}

/// Handle GET /api/navigation.
pub(crate) async fn get_navigation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<NavigationResponse>, ServerError> {
    let snapshot = blocking(move || state.site.snapshot()).await?;
    let groups = snapshot.tree().groups().to_vec();
    Ok(Json(NavigationResponse { groups }))
}
