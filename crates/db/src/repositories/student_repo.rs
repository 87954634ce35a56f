//! Repository for the `students` table.

use sqlx::PgPool;

use campus_core::types::DbId;

use crate::models::student::{EnrolledStudentRow, Student};

/// Column list for `students` queries.
const COLUMNS: &str = "id, school_id, user_id, section_id, created_at, updated_at";

/// Provides lookups for student profiles.
pub struct StudentRepo;

impl StudentRepo {
    /// Find a student profile by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the student profile belonging to a user account.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE user_id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// All enrolled students of a school with their section's class name,
    /// the input shape for event targeting resolution. Students without a
    /// section are not enrolled and are excluded.
    pub async fn enrolled_with_class(
        pool: &PgPool,
        school_id: DbId,
    ) -> Result<Vec<EnrolledStudentRow>, sqlx::Error> {
        sqlx::query_as::<_, EnrolledStudentRow>(
            "SELECT s.id, sec.class_name
             FROM students s
             JOIN sections sec ON sec.id = s.section_id
             WHERE s.school_id = $1
             ORDER BY s.id ASC",
        )
        .bind(school_id)
        .fetch_all(pool)
        .await
    }

    /// Student ids enrolled in a section.
    pub async fn ids_in_section(
        pool: &PgPool,
        section_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> =
            sqlx::query_as("SELECT id FROM students WHERE section_id = $1 ORDER BY id ASC")
                .bind(section_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
