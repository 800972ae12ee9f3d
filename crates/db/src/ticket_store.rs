//! Postgres-backed [`TicketStore`].

use async_trait::async_trait;
use sqlx::PgPool;
use ticketgate_core::ticket_store::{
    ScanAuditEntry, StatusChange, StoreError, StoreResult, StoredTicket, TicketStore,
};
use ticketgate_core::types::TicketId;

use crate::models::ticket::Ticket;
use crate::repositories::{ScanAuditRepo, TicketRepo};

/// Adapts [`TicketRepo`] and [`ScanAuditRepo`] to the scanner's storage seam.
#[derive(Clone)]
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "Ticket store query failed");
    StoreError::Unavailable(err.to_string())
}

fn to_stored(row: Option<Ticket>) -> StoreResult<Option<StoredTicket>> {
    row.map(StoredTicket::try_from).transpose()
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn get_ticket_by_payload(&self, qr_payload: &str) -> StoreResult<Option<StoredTicket>> {
        let row = TicketRepo::find_by_payload(&self.pool, qr_payload)
            .await
            .map_err(unavailable)?;
        to_stored(row)
    }

    async fn get_ticket_by_id(&self, id: TicketId) -> StoreResult<Option<StoredTicket>> {
        let row = TicketRepo::find_by_id(&self.pool, id)
            .await
            .map_err(unavailable)?;
        to_stored(row)
    }

    async fn compare_and_swap_status(
        &self,
        change: StatusChange,
    ) -> StoreResult<Option<StoredTicket>> {
        let row = TicketRepo::compare_and_swap_status(
            &self.pool,
            change.ticket_id,
            change.expected,
            change.new,
            change.operator_id,
            change.at,
        )
        .await
        .map_err(unavailable)?;
        to_stored(row)
    }

    async fn append_audit_entry(&self, entry: ScanAuditEntry) -> StoreResult<()> {
        ScanAuditRepo::insert(&self.pool, &entry)
            .await
            .map(|_| ())
            .map_err(unavailable)
    }

    async fn list_audit_entries(&self, ticket_id: TicketId) -> StoreResult<Vec<ScanAuditEntry>> {
        ScanAuditRepo::list_by_ticket(&self.pool, ticket_id)
            .await
            .map_err(unavailable)?
            .into_iter()
            .map(ScanAuditEntry::try_from)
            .collect()
    }
}
