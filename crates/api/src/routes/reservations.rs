//! Route definitions for the `/reservations` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reservations;
use crate::state::AppState;

/// Routes mounted at `/reservations`.
///
/// ```text
/// POST /                 -> create
/// GET  /{id}             -> get_by_id
/// POST /{id}/confirm     -> confirm (admin)
/// POST /{id}/cancel      -> cancel
/// GET  /{id}/tickets     -> list_tickets
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(reservations::create))
        .route("/{id}", get(reservations::get_by_id))
        .route("/{id}/confirm", post(reservations::confirm))
        .route("/{id}/cancel", post(reservations::cancel))
        .route("/{id}/tickets", get(reservations::list_tickets))
}
