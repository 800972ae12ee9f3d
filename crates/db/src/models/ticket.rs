//! Ticket entity model.

use serde::Serialize;
use sqlx::FromRow;
use ticketgate_core::ticket_store::{StoreError, StoredTicket};
use ticketgate_core::types::{DbId, TicketId, Timestamp};

/// A row from the `tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: TicketId,
    pub reservation_id: DbId,
    pub event_id: DbId,
    pub participant_name: String,
    pub ticket_number: i32,
    /// The ticket owner needs this to render the QR code.
    pub qr_payload: String,
    pub status: String,
    pub validated_at: Option<Timestamp>,
    pub validated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<Ticket> for StoredTicket {
    type Error = StoreError;

    fn try_from(row: Ticket) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("ticket {} has status '{}'", row.id, row.status)))?;
        Ok(StoredTicket {
            id: row.id,
            reservation_id: row.reservation_id,
            event_id: row.event_id,
            participant_name: row.participant_name,
            ticket_number: row.ticket_number,
            qr_payload: row.qr_payload,
            status,
            validated_at: row.validated_at,
            validated_by: row.validated_by,
        })
    }
}
