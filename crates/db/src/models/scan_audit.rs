//! Scan audit log model. Rows are immutable once inserted (no `updated_at`).

use serde::Serialize;
use sqlx::FromRow;
use ticketgate_core::ticket_store::{ScanAuditEntry, StoreError};
use ticketgate_core::types::{DbId, TicketId, Timestamp};

/// A row from the `scan_audit_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScanAuditLog {
    pub id: DbId,
    pub ticket_id: Option<TicketId>,
    pub event_id: DbId,
    pub action: String,
    pub operator_id: DbId,
    pub outcome: String,
    pub reason: Option<String>,
    pub message: String,
    pub created_at: Timestamp,
}

impl TryFrom<ScanAuditLog> for ScanAuditEntry {
    type Error = StoreError;

    fn try_from(row: ScanAuditLog) -> Result<Self, Self::Error> {
        Ok(ScanAuditEntry {
            ticket_id: row.ticket_id,
            event_id: row.event_id,
            action: row
                .action
                .parse()
                .map_err(|_| StoreError::Corrupt(format!("audit {} has action '{}'", row.id, row.action)))?,
            operator_id: row.operator_id,
            outcome: row.outcome.parse()?,
            reason: row.reason,
            message: row.message,
            recorded_at: row.created_at,
        })
    }
}
