//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Helpers that must run inside a
//! caller's transaction take `&mut PgConnection` instead.

pub mod event_repo;
pub mod reservation_repo;
pub mod scan_audit_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use event_repo::EventRepo;
pub use reservation_repo::{CancelOutcome, ConfirmOutcome, ReservationRepo};
pub use scan_audit_repo::ScanAuditRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;
