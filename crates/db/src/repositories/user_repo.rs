//! Repository for the `users` table.

use sqlx::PgPool;

use campus_core::types::DbId;

use crate::models::user::User;

/// Column list for `users` queries.
const COLUMNS: &str = "id, school_id, full_name, role, created_at, updated_at";

/// Provides lookups for users (teachers, parents, admins, student users).
pub struct UserRepo;

impl UserRepo {
    /// Find a user by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by id within one school. Returns `None` for users of
    /// other tenants, so callers fail closed on cross-tenant ids.
    pub async fn find_in_school(
        pool: &PgPool,
        id: DbId,
        school_id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND school_id = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(school_id)
            .fetch_optional(pool)
            .await
    }
}
