//! Student profile models.

use serde::Serialize;
use sqlx::FromRow;

use campus_core::types::{DbId, Timestamp};

/// A row from the `students` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: DbId,
    pub school_id: DbId,
    pub user_id: DbId,
    pub section_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An enrolled student joined with their section's class name, the shape
/// event targeting resolves against.
#[derive(Debug, Clone, FromRow)]
pub struct EnrolledStudentRow {
    pub id: DbId,
    pub class_name: String,
}

/// A child of a parent, for parent-facing listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChildRow {
    pub id: DbId,
    pub full_name: String,
    pub section_id: Option<DbId>,
    pub class_name: Option<String>,
}

/// One student-parent link row.
#[derive(Debug, Clone, FromRow)]
pub struct ParentLinkRow {
    pub student_id: DbId,
    pub parent_id: DbId,
}
