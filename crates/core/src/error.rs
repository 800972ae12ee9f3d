//! Domain error type shared by every ticketgate crate.

/// Errors raised by domain rules (validation, state transitions, lookups).
///
/// The api crate maps each variant to an HTTP status; the db crate never
/// produces these directly.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// `id` is a string because tickets are UUID-keyed while events and
    /// reservations use BIGSERIAL ids.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A state precondition no longer holds (seat count, reservation status).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] keyed by any displayable id.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
