//! In-memory [`TicketStore`].
//!
//! Tickets and audit rows live in maps guarded by `tokio::sync::RwLock`.
//! Not durable; used for tests and for running a scanner without Postgres.
//! The compare-and-swap holds the write lock across check and update, so it
//! has the same single-winner semantics as the SQL conditional update.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ticket_store::{
    ScanAuditEntry, StatusChange, StoreResult, StoredTicket, TicketStore,
};
use crate::types::TicketId;

#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    tickets: RwLock<HashMap<TicketId, StoredTicket>>,
    audit: RwLock<Vec<ScanAuditEntry>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace a ticket.
    pub async fn insert(&self, ticket: StoredTicket) {
        self.tickets.write().await.insert(ticket.id, ticket);
    }

    /// Total audit rows across all tickets.
    pub async fn audit_len(&self) -> usize {
        self.audit.read().await.len()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn get_ticket_by_payload(&self, qr_payload: &str) -> StoreResult<Option<StoredTicket>> {
        let tickets = self.tickets.read().await;
        Ok(tickets
            .values()
            .find(|t| t.qr_payload == qr_payload)
            .cloned())
    }

    async fn get_ticket_by_id(&self, id: TicketId) -> StoreResult<Option<StoredTicket>> {
        Ok(self.tickets.read().await.get(&id).cloned())
    }

    async fn compare_and_swap_status(
        &self,
        change: StatusChange,
    ) -> StoreResult<Option<StoredTicket>> {
        let mut tickets = self.tickets.write().await;
        let Some(ticket) = tickets.get_mut(&change.ticket_id) else {
            return Ok(None);
        };
        if ticket.status != change.expected {
            return Ok(None);
        }
        ticket.status = change.new;
        ticket.validated_at = Some(change.at);
        ticket.validated_by = Some(change.operator_id);
        Ok(Some(ticket.clone()))
    }

    async fn append_audit_entry(&self, entry: ScanAuditEntry) -> StoreResult<()> {
        self.audit.write().await.push(entry);
        Ok(())
    }

    async fn list_audit_entries(&self, ticket_id: TicketId) -> StoreResult<Vec<ScanAuditEntry>> {
        let audit = self.audit.read().await;
        Ok(audit
            .iter()
            .filter(|e| e.ticket_id == Some(ticket_id))
            .cloned()
            .collect())
    }
}
