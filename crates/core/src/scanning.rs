//! Scan orchestration: lookup, event check, state machine, CAS, audit.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::qr_codec::{QrCodec, QrPayload};
use crate::ticket_status::{
    evaluate, AlreadyUsedPolicy, ScanAction, ScanDecision, ScanRejection,
};
use crate::ticket_store::{
    ScanAuditEntry, ScanOutcome, StatusChange, StoreResult, StoredTicket, TicketStore,
};
use crate::types::DbId;

/// One scan presented at the gate.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    /// Raw string decoded from the QR symbol.
    pub qr_content: String,
    /// Event the gate is admitting to.
    pub event_id: DbId,
    pub action: ScanAction,
    #[serde(skip)]
    pub operator_id: DbId,
}

/// What the scanning station shows the operator.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ScanRejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<StoredTicket>,
}

impl ScanResult {
    fn rejected(reason: ScanRejection, ticket: Option<StoredTicket>) -> Self {
        Self {
            success: false,
            message: reason.message().to_string(),
            reason: Some(reason),
            ticket,
        }
    }
}

/// Validates scans against a [`TicketStore`].
#[derive(Clone)]
pub struct TicketScanner {
    store: Arc<dyn TicketStore>,
    codec: Arc<QrCodec>,
    policy: AlreadyUsedPolicy,
}

impl TicketScanner {
    pub fn new(store: Arc<dyn TicketStore>, codec: Arc<QrCodec>, policy: AlreadyUsedPolicy) -> Self {
        Self {
            store,
            codec,
            policy,
        }
    }

    /// Evaluate one scan and record it.
    ///
    /// Never retries; a lost compare-and-swap is reported as
    /// [`ScanRejection::StatusConflict`] and the operator rescans.
    pub async fn scan(&self, request: &ScanRequest) -> ScanResult {
        let ticket = match self.resolve_ticket(&request.qr_content).await {
            Ok(Some(ticket)) => ticket,
            Ok(None) => {
                return self
                    .finish(request, None, ScanResult::rejected(ScanRejection::TicketNotFound, None))
                    .await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Ticket lookup failed");
                return self
                    .finish(
                        request,
                        None,
                        ScanResult::rejected(ScanRejection::LookupFailed, None),
                    )
                    .await;
            }
        };

        if ticket.event_id != request.event_id {
            tracing::info!(
                ticket_id = %ticket.id,
                ticket_event_id = ticket.event_id,
                scanned_event_id = request.event_id,
                "Ticket presented at the wrong event",
            );
            let result = ScanResult::rejected(ScanRejection::WrongEvent, None);
            return self.finish(request, Some(&ticket), result).await;
        }

        let result = match evaluate(ticket.status, request.action, self.policy) {
            ScanDecision::Reject(reason) => ScanResult::rejected(reason, Some(ticket.clone())),
            ScanDecision::AdmitWithWarning(reason) => ScanResult {
                success: true,
                message: format!("Warning: {}", reason.message()),
                reason: Some(reason),
                ticket: Some(ticket.clone()),
            },
            ScanDecision::Transition { to } => {
                let change = StatusChange {
                    ticket_id: ticket.id,
                    expected: ticket.status,
                    new: to,
                    operator_id: request.operator_id,
                    at: Utc::now(),
                };
                match self.store.compare_and_swap_status(change).await {
                    Ok(Some(updated)) => {
                        tracing::info!(
                            ticket_id = %updated.id,
                            from = %ticket.status,
                            to = %updated.status,
                            action = %request.action,
                            operator_id = request.operator_id,
                            "Ticket scanned",
                        );
                        ScanResult {
                            success: true,
                            message: admitted_message(request.action).to_string(),
                            reason: None,
                            ticket: Some(updated),
                        }
                    }
                    Ok(None) => {
                        tracing::warn!(
                            ticket_id = %ticket.id,
                            expected = %ticket.status,
                            "Ticket status changed concurrently",
                        );
                        ScanResult::rejected(ScanRejection::StatusConflict, Some(ticket.clone()))
                    }
                    Err(e) => {
                        tracing::error!(ticket_id = %ticket.id, error = %e, "Ticket status update failed");
                        ScanResult::rejected(ScanRejection::StorageWriteFailed, Some(ticket.clone()))
                    }
                }
            }
        };

        self.finish(request, Some(&ticket), result).await
    }

    /// Read-only lookup of the ticket behind a presented code.
    ///
    /// Resolves codes exactly as [`scan`](Self::scan) does but changes no
    /// state and writes no audit entry.
    pub async fn verify(&self, qr_content: &str) -> StoreResult<Option<StoredTicket>> {
        self.resolve_ticket(qr_content).await
    }

    /// Verbatim lookup first, then decode-and-verify.
    ///
    /// The decode path accepts any authentic envelope for a ticket (the
    /// same seal re-serialized, say) as long as every sealed identity field
    /// matches the stored row.
    async fn resolve_ticket(&self, qr_content: &str) -> StoreResult<Option<StoredTicket>> {
        if let Some(ticket) = self.store.get_ticket_by_payload(qr_content).await? {
            return Ok(Some(ticket));
        }

        let payload = match self.codec.decode(qr_content) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(kind = ?e, "Scanned code rejected by codec");
                return Ok(None);
            }
        };

        let Ok(ticket_id) = payload.ticket_id.parse() else {
            tracing::warn!(ticket_id = %payload.ticket_id, "Authentic payload with malformed ticket id");
            return Ok(None);
        };

        let Some(ticket) = self.store.get_ticket_by_id(ticket_id).await? else {
            return Ok(None);
        };
        if !seal_matches(&payload, &ticket) {
            tracing::warn!(ticket_id = %ticket.id, "Authentic payload disagrees with stored ticket");
            return Ok(None);
        }
        Ok(Some(ticket))
    }

    /// Append the audit row and hand back the result.
    ///
    /// Audit failures are logged; they do not change what the operator sees.
    async fn finish(
        &self,
        request: &ScanRequest,
        ticket: Option<&StoredTicket>,
        result: ScanResult,
    ) -> ScanResult {
        let outcome = match (result.success, result.reason.is_some()) {
            (true, false) => ScanOutcome::Admitted,
            (true, true) => ScanOutcome::Warned,
            (false, _) => ScanOutcome::Rejected,
        };
        let entry = ScanAuditEntry {
            ticket_id: ticket.map(|t| t.id),
            event_id: request.event_id,
            action: request.action,
            operator_id: request.operator_id,
            outcome,
            reason: result.reason.map(|r| r.code().to_string()),
            message: result.message.clone(),
            recorded_at: Utc::now(),
        };

        if let Err(e) = self.store.append_audit_entry(entry).await {
            tracing::error!(error = %e, "Failed to append scan audit entry");
        }
        result
    }
}

fn seal_matches(payload: &QrPayload, ticket: &StoredTicket) -> bool {
    payload.reservation_id == ticket.reservation_id.to_string()
        && payload.event_id == ticket.event_id.to_string()
        && i64::from(payload.ticket_number) == i64::from(ticket.ticket_number)
        && payload.participant_name == ticket.participant_name
}

fn admitted_message(action: ScanAction) -> &'static str {
    match action {
        ScanAction::Entry => "Entry granted",
        ScanAction::Exit => "Exit recorded",
        ScanAction::ReEntry => "Re-entry granted",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
