//! Entry lookup handler
//!
//! Lets a reviewer see what an entry holds right now, next to the
//! before/after snapshots carried by the change itself.

use axum::extract::{Path, State};
use axum::Json;
use lexd_common::Entry;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/entries/:form
pub async fn get_entry(
    State(state): State<AppState>,
    Path(form): Path<String>,
) -> ApiResult<Json<Entry>> {
    let entry = state
        .entries
        .get(&form)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("entry '{form}'")))?;
    Ok(Json(entry))
}
