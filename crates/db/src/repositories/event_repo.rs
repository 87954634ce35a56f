//! Repository for the `events` table.

use sqlx::PgPool;

use campus_core::types::{DbId, Timestamp};

use crate::models::event::{CreateEvent, Event};

/// Column list for `events` queries.
const COLUMNS: &str = "id, school_id, title, event_type, starts_at, deadline, \
    target_audience, requires_approval, capacity, fee_cents, created_by, \
    created_at, updated_at";

/// Provides data access for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events
                (school_id, title, event_type, starts_at, deadline, target_audience,
                 requires_approval, capacity, fee_cents, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(input.school_id)
            .bind(&input.title)
            .bind(&input.event_type)
            .bind(input.starts_at)
            .bind(input.deadline)
            .bind(&input.target_audience)
            .bind(input.requires_approval)
            .bind(input.capacity)
            .bind(input.fee_cents)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find an event by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Upcoming events for a school, soonest first.
    pub async fn upcoming_for_school(
        pool: &PgPool,
        school_id: DbId,
        now: Timestamp,
        limit: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE school_id = $1 AND starts_at >= $2
             ORDER BY starts_at ASC
             LIMIT $3"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(school_id)
            .bind(now)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
