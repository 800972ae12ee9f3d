//! Route definitions for the `/tickets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tickets;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// POST /verify        -> verify (staff or admin)
/// GET  /{id}/scans    -> list_scans (staff or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/verify", post(tickets::verify))
        .route("/{id}/scans", get(tickets::list_scans))
}
