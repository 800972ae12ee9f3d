//! Route definitions for `/scan`.

use axum::routing::post;
use axum::Router;

use crate::handlers::scan;
use crate::state::AppState;

/// Routes mounted at `/scan`.
///
/// ```text
/// POST /    -> scan (staff or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(scan::scan))
}
