//! Handlers for the `/reservations` resource.
//!
//! Customers create and cancel their own reservations; confirming (payment
//! accepted) is an admin action that takes the places and issues tickets.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use ticketgate_core::error::CoreError;
use ticketgate_core::issuance::{build_tickets, IssueRequest};
use ticketgate_core::reservation::{validate_participants, validate_transition, STATUS_CONFIRMED};
use ticketgate_core::types::DbId;
use ticketgate_db::models::reservation::{CreateReservation, Reservation};
use ticketgate_db::models::ticket::Ticket;
use ticketgate_db::repositories::{
    CancelOutcome, ConfirmOutcome, EventRepo, ReservationRepo, TicketRepo,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ConfirmedReservation {
    pub reservation: Reservation,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Serialize)]
pub struct CancelledReservation {
    pub reservation: Reservation,
    pub tickets_cancelled: u64,
    pub places_released: i32,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load(state: &AppState, id: DbId) -> AppResult<Reservation> {
    ReservationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Reservation", id)))
}

/// Owners see their own reservations; admins see all.
fn ensure_owner_or_admin(user: &AuthUser, reservation: &Reservation) -> AppResult<()> {
    if user.is_admin() || reservation.user_id == user.user_id {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Not your reservation".into(),
        )))
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/reservations
///
/// Creates a `pending` reservation. Places are only taken on confirmation,
/// so the availability check here is advisory.
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<DataResponse<Reservation>>)> {
    input.validate()?;
    validate_participants(&input.participants)?;

    let event = EventRepo::find_by_id(&state.pool, input.event_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Event", input.event_id)))?;

    if (event.available_places as usize) < input.participants.len() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Only {} places left for this event",
            event.available_places
        ))));
    }

    let reservation = ReservationRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(
        reservation_id = reservation.id,
        event_id = event.id,
        user_id = user.user_id,
        places = reservation.places(),
        "Reservation created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: reservation })))
}

/// GET /api/v1/reservations/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Reservation>>> {
    let reservation = load(&state, id).await?;
    ensure_owner_or_admin(&user, &reservation)?;
    Ok(Json(DataResponse { data: reservation }))
}

/// POST /api/v1/reservations/{id}/confirm
///
/// Seals one ticket per participant, then confirms, takes places, and
/// inserts the tickets in a single transaction.
pub async fn confirm(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ConfirmedReservation>>> {
    let reservation = load(&state, id).await?;
    validate_transition(&reservation.status, STATUS_CONFIRMED)?;

    let event = EventRepo::find_by_id(&state.pool, reservation.event_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Event", reservation.event_id)))?;

    let tickets = build_tickets(
        &state.qr_codec,
        &IssueRequest {
            reservation_id: reservation.id,
            event_id: event.id,
            event_date: event.event_date,
            participants: reservation.participants.clone(),
        },
        Utc::now(),
    )?;

    match ReservationRepo::confirm(&state.pool, id, &tickets).await? {
        ConfirmOutcome::Confirmed {
            reservation,
            tickets,
        } => {
            tracing::info!(
                reservation_id = reservation.id,
                tickets = tickets.len(),
                admin_id = admin.user_id,
                "Reservation confirmed, tickets issued",
            );
            Ok(Json(DataResponse {
                data: ConfirmedReservation {
                    reservation,
                    tickets,
                },
            }))
        }
        ConfirmOutcome::NotPending => Err(AppError::Core(CoreError::Conflict(
            "Reservation is no longer pending".into(),
        ))),
        ConfirmOutcome::NotEnoughPlaces => Err(AppError::Core(CoreError::Conflict(
            "Not enough places left for this event".into(),
        ))),
    }
}

/// POST /api/v1/reservations/{id}/cancel
pub async fn cancel(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CancelledReservation>>> {
    let reservation = load(&state, id).await?;
    ensure_owner_or_admin(&user, &reservation)?;

    match ReservationRepo::cancel(&state.pool, id).await? {
        Some(CancelOutcome::Cancelled {
            reservation,
            tickets_cancelled,
            places_released,
        }) => {
            tracing::info!(
                reservation_id = reservation.id,
                tickets_cancelled,
                places_released,
                user_id = user.user_id,
                "Reservation cancelled",
            );
            Ok(Json(DataResponse {
                data: CancelledReservation {
                    reservation,
                    tickets_cancelled,
                    places_released,
                },
            }))
        }
        Some(CancelOutcome::AlreadyCancelled) => Err(AppError::Core(CoreError::Conflict(
            "Reservation is already cancelled".into(),
        ))),
        None => Err(AppError::Core(CoreError::not_found("Reservation", id))),
    }
}

/// GET /api/v1/reservations/{id}/tickets
///
/// Includes each ticket's `qr_payload` so the owner can render the codes.
pub async fn list_tickets(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Ticket>>>> {
    let reservation = load(&state, id).await?;
    ensure_owner_or_admin(&user, &reservation)?;
    let tickets = TicketRepo::list_by_reservation(&state.pool, id).await?;
    Ok(Json(DataResponse { data: tickets }))
}
