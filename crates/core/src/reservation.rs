//! Reservation status constants, transition rules, and participant validation.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Created at checkout, no places held yet.
pub const STATUS_PENDING: &str = "pending";
/// Payment accepted; places decremented and tickets issued.
pub const STATUS_CONFIRMED: &str = "confirmed";
/// Terminal. Tickets cancelled, places returned if previously confirmed.
pub const STATUS_CANCELLED: &str = "cancelled";

pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_CONFIRMED, STATUS_CANCELLED];

// ---------------------------------------------------------------------------
// Participant limits
// ---------------------------------------------------------------------------

/// Maximum participants (and therefore tickets) on one reservation.
pub const MAX_PARTICIPANTS: usize = 20;

/// Maximum participant name length in characters.
pub const MAX_PARTICIPANT_NAME_LEN: usize = 100;

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Statuses reachable from `from_status`.
///
/// - `pending`   -> `confirmed`, `cancelled`
/// - `confirmed` -> `cancelled`
/// - `cancelled` -> (none)
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_PENDING => &[STATUS_CONFIRMED, STATUS_CANCELLED],
        STATUS_CONFIRMED => &[STATUS_CANCELLED],
        _ => &[],
    }
}

pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    if valid_transitions(current).contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Cannot transition reservation from '{current}' to '{next}'"
        )))
    }
}

/// Check a participant list before it is stored or turned into tickets.
pub fn validate_participants(participants: &[String]) -> Result<(), CoreError> {
    if participants.is_empty() {
        return Err(CoreError::Validation(
            "A reservation needs at least one participant".into(),
        ));
    }
    if participants.len() > MAX_PARTICIPANTS {
        return Err(CoreError::Validation(format!(
            "A reservation may list at most {MAX_PARTICIPANTS} participants (got {})",
            participants.len()
        )));
    }
    for (i, name) in participants.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Participant {} has an empty name",
                i + 1
            )));
        }
        if name.chars().count() > MAX_PARTICIPANT_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "Participant {} name exceeds {MAX_PARTICIPANT_NAME_LEN} characters",
                i + 1
            )));
        }
    }
    Ok(())
}
