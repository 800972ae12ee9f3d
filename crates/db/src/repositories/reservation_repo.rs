//! Repository for the `reservations` table.
//!
//! Confirmation and cancellation touch three tables (reservations, events,
//! tickets) and always run in one transaction.

use sqlx::PgPool;
use ticketgate_core::issuance::NewTicket;
use ticketgate_core::reservation::{STATUS_CANCELLED, STATUS_CONFIRMED, STATUS_PENDING};
use ticketgate_core::types::DbId;

use crate::models::reservation::{CreateReservation, Reservation};
use crate::models::ticket::Ticket;
use crate::repositories::{EventRepo, TicketRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, event_id, user_id, status, participants, \
                        confirmed_at, cancelled_at, created_at, updated_at";

/// Result of [`ReservationRepo::confirm`].
#[derive(Debug)]
pub enum ConfirmOutcome {
    Confirmed {
        reservation: Reservation,
        tickets: Vec<Ticket>,
    },
    /// The reservation was no longer pending (already confirmed or cancelled).
    NotPending,
    /// The event has fewer places left than the reservation needs.
    NotEnoughPlaces,
}

/// Result of [`ReservationRepo::cancel`].
#[derive(Debug)]
pub enum CancelOutcome {
    Cancelled {
        reservation: Reservation,
        tickets_cancelled: u64,
        places_released: i32,
    },
    AlreadyCancelled,
}

/// Provides CRUD and lifecycle operations for reservations.
pub struct ReservationRepo;

impl ReservationRepo {
    /// Insert a pending reservation. No places are held yet.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateReservation,
    ) -> Result<Reservation, sqlx::Error> {
        let participants: Vec<String> =
            input.participants.iter().map(|p| p.trim().to_string()).collect();
        let query = format!(
            "INSERT INTO reservations (event_id, user_id, status, participants)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(input.event_id)
            .bind(user_id)
            .bind(STATUS_PENDING)
            .bind(&participants)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reservations WHERE id = $1");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Confirm a pending reservation, take its places, and insert `tickets`.
    ///
    /// All three writes commit together or not at all. `tickets` must have
    /// been built from this reservation's participant list.
    pub async fn confirm(
        pool: &PgPool,
        id: DbId,
        tickets: &[NewTicket],
    ) -> Result<ConfirmOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE reservations SET status = $2, confirmed_at = NOW() \
             WHERE id = $1 AND status = $3 \
             RETURNING {COLUMNS}"
        );
        let reservation = sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(STATUS_CONFIRMED)
            .bind(STATUS_PENDING)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(reservation) = reservation else {
            tx.rollback().await?;
            return Ok(ConfirmOutcome::NotPending);
        };

        if !EventRepo::reserve_places(&mut *tx, reservation.event_id, reservation.places()).await? {
            tx.rollback().await?;
            return Ok(ConfirmOutcome::NotEnoughPlaces);
        }

        let tickets = TicketRepo::insert_many(&mut *tx, tickets).await?;
        tx.commit().await?;

        Ok(ConfirmOutcome::Confirmed {
            reservation,
            tickets,
        })
    }

    /// Cancel a reservation and every ticket it issued.
    ///
    /// Places are returned to the event only if the reservation had been
    /// confirmed. Returns `None` if the reservation does not exist.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<Option<CancelOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM reservations WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        if current.status == STATUS_CANCELLED {
            tx.rollback().await?;
            return Ok(Some(CancelOutcome::AlreadyCancelled));
        }

        let query = format!(
            "UPDATE reservations SET status = $2, cancelled_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let reservation = sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(STATUS_CANCELLED)
            .fetch_one(&mut *tx)
            .await?;

        let tickets_cancelled = TicketRepo::cancel_for_reservation(&mut *tx, id).await?;

        let places_released = if current.status == STATUS_CONFIRMED {
            EventRepo::release_places(&mut *tx, current.event_id, current.places()).await?;
            current.places()
        } else {
            0
        };

        tx.commit().await?;

        Ok(Some(CancelOutcome::Cancelled {
            reservation,
            tickets_cancelled,
            places_released,
        }))
    }
}
