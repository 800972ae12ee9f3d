//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts, where the API accepts one

pub mod event;
pub mod reservation;
pub mod scan_audit;
pub mod ticket;
pub mod user;
