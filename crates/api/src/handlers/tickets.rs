//! Handlers for the `/tickets` resource: read-only verification and the
//! per-ticket scan history.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use ticketgate_core::error::CoreError;
use ticketgate_core::ticket_status::{ScanRejection, TicketStatus};
use ticketgate_core::ticket_store::StoredTicket;
use ticketgate_core::types::{DbId, TicketId};
use ticketgate_db::models::scan_audit::ScanAuditLog;
use ticketgate_db::repositories::{ScanAuditRepo, TicketRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /tickets/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub qr_content: String,
    /// When set, a ticket for another event is reported as invalid.
    pub event_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<StoredTicket>,
}

impl VerifyResponse {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            ticket: None,
        }
    }
}

/// POST /api/v1/tickets/verify
///
/// Looks up the ticket behind a code without changing its status or
/// writing an audit entry.
pub async fn verify(
    RequireStaff(_operator): RequireStaff,
    State(state): State<AppState>,
    Json(input): Json<VerifyRequest>,
) -> AppResult<Json<DataResponse<VerifyResponse>>> {
    let ticket = state
        .scanner
        .verify(&input.qr_content)
        .await
        .map_err(|e| AppError::InternalError(format!("Ticket lookup failed: {e}")))?;

    let response = match ticket {
        None => VerifyResponse::invalid(ScanRejection::TicketNotFound.message()),
        Some(t) if input.event_id.is_some_and(|id| id != t.event_id) => {
            VerifyResponse::invalid(ScanRejection::WrongEvent.message())
        }
        Some(t) if t.status == TicketStatus::Cancelled => VerifyResponse {
            valid: false,
            message: ScanRejection::Cancelled.message().into(),
            ticket: Some(t),
        },
        Some(t) => VerifyResponse {
            valid: true,
            message: format!("Ticket is {}", t.status),
            ticket: Some(t),
        },
    };

    Ok(Json(DataResponse { data: response }))
}

/// GET /api/v1/tickets/{id}/scans
pub async fn list_scans(
    RequireStaff(_operator): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<TicketId>,
) -> AppResult<Json<DataResponse<Vec<ScanAuditLog>>>> {
    TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Ticket", id)))?;

    let scans = ScanAuditRepo::list_by_ticket(&state.pool, id).await?;
    Ok(Json(DataResponse { data: scans }))
}
