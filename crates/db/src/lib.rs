//! Postgres persistence for ticketgate.
//!
//! Models live in [`models`], query code in [`repositories`], and
//! [`ticket_store::PgTicketStore`] adapts the ticket repositories to the
//! core [`ticketgate_core::ticket_store::TicketStore`] trait.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod ticket_store;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

/// Apply every pending migration from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
