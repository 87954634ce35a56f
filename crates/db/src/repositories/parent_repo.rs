//! Repository for the `parent_links` table and parent-side lookups.

use sqlx::PgPool;

use campus_core::types::DbId;

use crate::models::student::{ChildRow, ParentLinkRow};

/// Provides parent-child link lookups.
pub struct ParentRepo;

impl ParentRepo {
    /// All parent links for the given students, the input shape for
    /// approval pair expansion.
    pub async fn links_for_students(
        pool: &PgPool,
        student_ids: &[DbId],
    ) -> Result<Vec<ParentLinkRow>, sqlx::Error> {
        sqlx::query_as::<_, ParentLinkRow>(
            "SELECT student_id, parent_id
             FROM parent_links
             WHERE student_id = ANY($1)
             ORDER BY student_id ASC, parent_id ASC",
        )
        .bind(student_ids)
        .fetch_all(pool)
        .await
    }

    /// The children linked to a parent, with class names where enrolled.
    pub async fn children_of(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<Vec<ChildRow>, sqlx::Error> {
        sqlx::query_as::<_, ChildRow>(
            "SELECT s.id, u.full_name, s.section_id, sec.class_name
             FROM parent_links pl
             JOIN students s ON s.id = pl.student_id
             JOIN users u ON u.id = s.user_id
             LEFT JOIN sections sec ON sec.id = s.section_id
             WHERE pl.parent_id = $1
             ORDER BY s.id ASC",
        )
        .bind(parent_id)
        .fetch_all(pool)
        .await
    }

    /// Whether a parent is linked to a student. Ownership checks fail
    /// closed on a `false` here.
    pub async fn is_linked(
        pool: &PgPool,
        parent_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(
                SELECT 1 FROM parent_links
                WHERE parent_id = $1 AND student_id = $2
             )",
        )
        .bind(parent_id)
        .bind(student_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
