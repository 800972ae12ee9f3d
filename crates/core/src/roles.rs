//! Well-known role name constants.
//!
//! These must match the CHECK constraint in `20260301000001_create_users.sql`.

/// Back-office administrator: manages events and reservations, can scan.
pub const ROLE_ADMIN: &str = "admin";
/// On-site staff operating the ticket scanner.
pub const ROLE_STAFF: &str = "staff";
/// Parent / guardian booking events.
pub const ROLE_CUSTOMER: &str = "customer";

/// All roles accepted by the `users.role` column.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_STAFF, ROLE_CUSTOMER];

/// Whether a role may operate the ticket scanner.
pub fn can_scan(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_STAFF
}
