pub mod auth;
pub mod events;
pub mod reservations;
pub mod scan;
pub mod tickets;
