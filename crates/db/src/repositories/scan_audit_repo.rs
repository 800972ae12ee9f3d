//! Repository for the append-only `scan_audit_logs` table.

use sqlx::PgPool;
use ticketgate_core::ticket_store::ScanAuditEntry;
use ticketgate_core::types::TicketId;

use crate::models::scan_audit::ScanAuditLog;

/// Column list for `scan_audit_logs` SELECT queries.
const COLUMNS: &str = "\
    id, ticket_id, event_id, action, operator_id, \
    outcome, reason, message, created_at";

/// Insert and query operations for scan audit rows. No update or delete.
pub struct ScanAuditRepo;

impl ScanAuditRepo {
    pub async fn insert(
        pool: &PgPool,
        entry: &ScanAuditEntry,
    ) -> Result<ScanAuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO scan_audit_logs \
                (ticket_id, event_id, action, operator_id, outcome, reason, message, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScanAuditLog>(&query)
            .bind(entry.ticket_id)
            .bind(entry.event_id)
            .bind(entry.action.as_str())
            .bind(entry.operator_id)
            .bind(entry.outcome.as_str())
            .bind(&entry.reason)
            .bind(&entry.message)
            .bind(entry.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// Audit trail for one ticket, oldest first.
    pub async fn list_by_ticket(
        pool: &PgPool,
        ticket_id: TicketId,
    ) -> Result<Vec<ScanAuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scan_audit_logs \
             WHERE ticket_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ScanAuditLog>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }
}
