//! Repository for the `schools` table and school-wide counts.

use sqlx::PgPool;

use campus_core::types::DbId;

use crate::models::school::School;

/// Column list for `schools` queries.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides lookups for schools and tenant-wide rollup counts.
pub struct SchoolRepo;

impl SchoolRepo {
    /// Find a school by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<School>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schools WHERE id = $1");
        sqlx::query_as::<_, School>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Headcounts for the admin dashboard.
    ///
    /// Returns `(students, teachers, sections)`.
    pub async fn headcounts(
        pool: &PgPool,
        school_id: DbId,
    ) -> Result<(i64, i64, i64), sqlx::Error> {
        let row: (Option<i64>, Option<i64>, Option<i64>) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM students WHERE school_id = $1),
                (SELECT COUNT(*) FROM users WHERE school_id = $1 AND role = 'teacher'),
                (SELECT COUNT(*) FROM sections WHERE school_id = $1)",
        )
        .bind(school_id)
        .fetch_one(pool)
        .await?;

        Ok((row.0.unwrap_or(0), row.1.unwrap_or(0), row.2.unwrap_or(0)))
    }
}
