//! Change queue handlers

use axum::extract::{Path, State};
use axum::Json;
use lexd_common::Change;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::review;
use crate::AppState;

/// GET /api/changes
///
/// All pending changes, oldest first.
pub async fn list_pending(State(state): State<AppState>) -> ApiResult<Json<Vec<Change>>> {
    let pending = state.changes.all_pending().await?;
    Ok(Json(pending))
}

/// GET /api/changes/:id
pub async fn get_change(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Change>> {
    let change = state
        .changes
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("change {id}")))?;
    Ok(Json(change))
}

/// POST /api/changes/:id/approve
///
/// Writes the proposed senses into the entry store, then marks the change
/// approved. Responds with the settled change.
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Change>> {
    let change = review::approve_change(&state.entries, &state.changes, id).await?;
    info!("Approved change {} for '{}'", id, change.form);
    Ok(Json(change))
}

/// POST /api/changes/:id/reject
///
/// Marks the change rejected. The entry store is not touched.
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Change>> {
    let change = review::reject_change(&state.changes, id).await?;
    info!("Rejected change {} for '{}'", id, change.form);
    Ok(Json(change))
}
