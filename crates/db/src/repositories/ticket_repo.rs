//! Repository for the `tickets` table.
//!
//! There is deliberately no method that writes `qr_payload` after insert.

use sqlx::{PgConnection, PgPool};
use ticketgate_core::issuance::NewTicket;
use ticketgate_core::ticket_status::TicketStatus;
use ticketgate_core::types::{DbId, TicketId, Timestamp};

use crate::models::ticket::Ticket;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, reservation_id, event_id, participant_name, ticket_number, \
                        qr_payload, status, validated_at, validated_by, created_at, updated_at";

/// Provides lookups and status transitions for tickets.
pub struct TicketRepo;

impl TicketRepo {
    /// Insert freshly issued tickets inside the caller's transaction.
    pub async fn insert_many(
        conn: &mut PgConnection,
        tickets: &[NewTicket],
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets
                (id, reservation_id, event_id, participant_name, ticket_number, qr_payload, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );

        let mut inserted = Vec::with_capacity(tickets.len());
        for t in tickets {
            let row = sqlx::query_as::<_, Ticket>(&query)
                .bind(t.id)
                .bind(t.reservation_id)
                .bind(t.event_id)
                .bind(&t.participant_name)
                .bind(t.ticket_number)
                .bind(&t.qr_payload)
                .bind(t.status.as_str())
                .fetch_one(&mut *conn)
                .await?;
            inserted.push(row);
        }
        Ok(inserted)
    }

    pub async fn find_by_id(pool: &PgPool, id: TicketId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Exact match on the issued QR string (backed by `uq_tickets_qr_payload`).
    pub async fn find_by_payload(
        pool: &PgPool,
        qr_payload: &str,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE qr_payload = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(qr_payload)
            .fetch_optional(pool)
            .await
    }

    /// All tickets of a reservation, in ticket-number order.
    pub async fn list_by_reservation(
        pool: &PgPool,
        reservation_id: DbId,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets WHERE reservation_id = $1 ORDER BY ticket_number ASC"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(reservation_id)
            .fetch_all(pool)
            .await
    }

    /// Move a ticket from `expected` to `new` in a single conditional UPDATE.
    ///
    /// Returns `None` if the ticket does not exist or is no longer in
    /// `expected` (another scan got there first).
    pub async fn compare_and_swap_status(
        pool: &PgPool,
        id: TicketId,
        expected: TicketStatus,
        new: TicketStatus,
        validated_by: DbId,
        validated_at: Timestamp,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET status = $3, validated_at = $4, validated_by = $5 \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(expected.as_str())
            .bind(new.as_str())
            .bind(validated_at)
            .bind(validated_by)
            .fetch_optional(pool)
            .await
    }

    /// Cancel every ticket of a reservation inside the caller's transaction.
    ///
    /// Returns the number of tickets cancelled.
    pub async fn cancel_for_reservation(
        conn: &mut PgConnection,
        reservation_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tickets SET status = $2 \
             WHERE reservation_id = $1 AND status <> $2",
        )
        .bind(reservation_id)
        .bind(TicketStatus::Cancelled.as_str())
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
