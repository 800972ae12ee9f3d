//! Ticketgate domain core.
//!
//! Zero internal dependencies: everything here is shared by the database
//! layer, the HTTP API, and any scanning-station tooling.

pub mod error;
pub mod issuance;
pub mod memory_store;
pub mod qr_codec;
pub mod reservation;
pub mod roles;
pub mod scan_session;
pub mod scanning;
pub mod ticket_status;
pub mod ticket_store;
pub mod types;
