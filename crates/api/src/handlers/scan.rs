//! Handler for `POST /scan`, the gate scanning endpoint.

use axum::extract::State;
use axum::Json;
use ticketgate_core::scanning::{ScanRequest, ScanResult};

use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/scan
///
/// A rejected scan is a normal outcome and still returns 200; the body's
/// `success` and `reason` fields carry the verdict.
pub async fn scan(
    RequireStaff(operator): RequireStaff,
    State(state): State<AppState>,
    Json(mut request): Json<ScanRequest>,
) -> AppResult<Json<DataResponse<ScanResult>>> {
    request.operator_id = operator.user_id;
    let result = state.scanner.scan(&request).await;
    Ok(Json(DataResponse { data: result }))
}
