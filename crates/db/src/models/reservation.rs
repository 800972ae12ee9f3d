//! Reservation entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ticketgate_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `reservations` table.
///
/// `status` is one of the `ticketgate_core::reservation::STATUS_*` constants.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reservation {
    pub id: DbId,
    pub event_id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub participants: Vec<String>,
    pub confirmed_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Reservation {
    /// Places this reservation holds (or will hold once confirmed).
    pub fn places(&self) -> i32 {
        self.participants.len() as i32
    }
}

/// DTO for creating a pending reservation. The owner comes from the token.
///
/// Per-name checks live in `ticketgate_core::reservation::validate_participants`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReservation {
    pub event_id: DbId,
    #[validate(length(min = 1, max = 20))]
    pub participants: Vec<String>,
}
