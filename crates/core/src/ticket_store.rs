//! Storage seam for the scanning workflow.
//!
//! The scanner never talks to a database directly; it is handed a
//! [`TicketStore`]. `ticketgate-db` provides the Postgres implementation and
//! [`crate::memory_store`] an in-process one.

use async_trait::async_trait;
use serde::Serialize;

use crate::ticket_status::{ScanAction, TicketStatus};
use crate::types::{DbId, TicketId, Timestamp};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A ticket as seen by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredTicket {
    pub id: TicketId,
    pub reservation_id: DbId,
    pub event_id: DbId,
    pub participant_name: String,
    pub ticket_number: i32,
    /// Never serialized back out; the QR string is a credential.
    #[serde(skip_serializing)]
    pub qr_payload: String,
    pub status: TicketStatus,
    pub validated_at: Option<Timestamp>,
    pub validated_by: Option<DbId>,
}

/// A requested `expected -> new` status change.
#[derive(Debug, Clone, Copy)]
pub struct StatusChange {
    pub ticket_id: TicketId,
    pub expected: TicketStatus,
    pub new: TicketStatus,
    pub operator_id: DbId,
    pub at: Timestamp,
}

/// Result class recorded for every scan attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    Admitted,
    Warned,
    Rejected,
}

impl ScanOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanOutcome::Admitted => "admitted",
            ScanOutcome::Warned => "warned",
            ScanOutcome::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for ScanOutcome {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admitted" => Ok(ScanOutcome::Admitted),
            "warned" => Ok(ScanOutcome::Warned),
            "rejected" => Ok(ScanOutcome::Rejected),
            other => Err(StoreError::Corrupt(format!("unknown scan outcome '{other}'"))),
        }
    }
}

/// One append-only audit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanAuditEntry {
    /// `None` when the presented code matched no ticket.
    pub ticket_id: Option<TicketId>,
    pub event_id: DbId,
    pub action: ScanAction,
    pub operator_id: DbId,
    pub outcome: ScanOutcome,
    /// Machine code from [`crate::ticket_status::ScanRejection::code`].
    pub reason: Option<String>,
    pub message: String,
    pub recorded_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached or the statement failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A row could not be mapped into a domain record.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Exact, byte-for-byte lookup on the issued QR string.
    async fn get_ticket_by_payload(&self, qr_payload: &str) -> StoreResult<Option<StoredTicket>>;

    async fn get_ticket_by_id(&self, id: TicketId) -> StoreResult<Option<StoredTicket>>;

    /// Atomically move a ticket from `change.expected` to `change.new`,
    /// stamping `validated_at` / `validated_by`.
    ///
    /// Returns `None` when the ticket's status was not `expected` (zero rows
    /// affected), which callers treat as a lost race.
    async fn compare_and_swap_status(
        &self,
        change: StatusChange,
    ) -> StoreResult<Option<StoredTicket>>;

    async fn append_audit_entry(&self, entry: ScanAuditEntry) -> StoreResult<()>;

    /// Audit trail for one ticket, oldest first.
    async fn list_audit_entries(&self, ticket_id: TicketId) -> StoreResult<Vec<ScanAuditEntry>>;
}
