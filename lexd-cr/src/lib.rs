//! lexd-cr library - Change Review module
//!
//! On-demand service for reviewing queued dictionary changes. Reviewers
//! list the pending queue, inspect a proposal's before/after senses, and
//! settle it: approval writes the proposed senses into the entry store,
//! rejection leaves the entry as it was. Either way the change keeps its
//! verdict permanently.

use axum::Router;
use lexd_common::db::{ChangeStore, EntryStore};

pub mod api;
pub mod error;
pub mod review;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Entry store, written on approval
    pub entries: EntryStore,
    /// Change queue under review
    pub changes: ChangeStore,
}

impl AppState {
    /// Create new application state
    pub fn new(entries: EntryStore, changes: ChangeStore) -> Self {
        Self { entries, changes }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/api/changes", get(api::changes::list_pending))
        .route("/api/changes/:id", get(api::changes::get_change))
        .route("/api/changes/:id/approve", post(api::changes::approve))
        .route("/api/changes/:id/reject", post(api::changes::reject))
        .route("/api/entries/:form", get(api::entries::get_entry))
        .merge(api::health::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
