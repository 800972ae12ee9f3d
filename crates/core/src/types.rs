/// All relational primary keys (events, reservations, users) are BIGSERIAL.
pub type DbId = i64;

/// Tickets are keyed by a UUID generated before insert so the id can be
/// sealed into the QR payload.
pub type TicketId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
