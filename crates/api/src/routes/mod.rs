pub mod auth;
pub mod events;
pub mod health;
pub mod reservations;
pub mod scan;
pub mod tickets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
///
/// /events                              list (public), create (admin)
/// /events/{id}                         get (public)
///
/// /reservations                        create (authenticated)
/// /reservations/{id}                   get (owner or admin)
/// /reservations/{id}/confirm           confirm and issue tickets (admin)
/// /reservations/{id}/cancel            cancel (owner or admin)
/// /reservations/{id}/tickets           issued tickets (owner or admin)
///
/// /scan                                scan at the gate (staff or admin)
///
/// /tickets/verify                      read-only code check (staff or admin)
/// /tickets/{id}/scans                  scan audit trail (staff or admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/events", events::router())
        .nest("/reservations", reservations::router())
        .nest("/scan", scan::router())
        .nest("/tickets", tickets::router())
}
