//! Repository for the `sections` table.

use sqlx::PgPool;

use campus_core::types::DbId;

use crate::models::section::Section;

/// Column list for `sections` queries.
const COLUMNS: &str = "id, school_id, name, class_name, teacher_id, created_at, updated_at";

/// Provides lookups for sections.
pub struct SectionRepo;

impl SectionRepo {
    /// Find a section by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Section>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sections WHERE id = $1");
        sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All sections assigned to a teacher, ordered by name.
    pub async fn list_for_teacher(
        pool: &PgPool,
        teacher_id: DbId,
    ) -> Result<Vec<Section>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sections
             WHERE teacher_id = $1
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Section>(&query)
            .bind(teacher_id)
            .fetch_all(pool)
            .await
    }
}
