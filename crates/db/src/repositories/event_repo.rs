//! Repository for the `events` table.

use sqlx::{PgConnection, PgPool};
use ticketgate_core::types::DbId;

use crate::models::event::{CreateEvent, Event};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, event_date, capacity, available_places, \
                        created_at, updated_at";

/// Provides query operations and seat accounting for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event with every place available.
    pub async fn create(pool: &PgPool, input: &CreateEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (title, description, event_date, capacity, available_places)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.event_date)
            .bind(input.capacity)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List events from today onwards, soonest first.
    pub async fn list_upcoming(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE event_date >= CURRENT_DATE \
             ORDER BY event_date ASC, id ASC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Take `places` seats if at least that many remain.
    ///
    /// Check and decrement happen in one statement, so concurrent
    /// confirmations can never oversell. Returns `false` when too few remain.
    pub async fn reserve_places(
        conn: &mut PgConnection,
        id: DbId,
        places: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET available_places = available_places - $2 \
             WHERE id = $1 AND available_places >= $2",
        )
        .bind(id)
        .bind(places)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Return `places` seats, never exceeding capacity.
    pub async fn release_places(
        conn: &mut PgConnection,
        id: DbId,
        places: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE events SET available_places = LEAST(capacity, available_places + $2) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(places)
        .execute(conn)
        .await?;
        Ok(())
    }
}
