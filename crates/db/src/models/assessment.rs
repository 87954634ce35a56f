//! Assessment and result models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campus_core::types::{Date, DbId, Timestamp};

/// A row from the `assessments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Assessment {
    pub id: DbId,
    pub school_id: DbId,
    pub section_id: DbId,
    pub subject_id: DbId,
    pub title: String,
    pub total_marks: i32,
    pub held_on: Option<Date>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `assessment_results` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssessmentResult {
    pub id: DbId,
    pub assessment_id: DbId,
    pub student_id: DbId,
    pub marks_obtained: i32,
    pub grade: String,
    pub graded_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording (or overwriting) one student's result.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordResult {
    pub assessment_id: DbId,
    pub student_id: DbId,
    pub marks_obtained: i32,
    pub grade: String,
    pub graded_by: DbId,
}

/// One result joined with its assessment and subject, the shape grade
/// aggregation reads.
#[derive(Debug, Clone, FromRow)]
pub struct StudentResultRow {
    pub subject_id: DbId,
    pub subject_name: String,
    pub marks_obtained: i32,
    pub total_marks: i32,
    pub grade: String,
}

/// Grading progress for one assessment of a teacher's sections.
#[derive(Debug, Clone, FromRow)]
pub struct GradingProgressRow {
    pub assessment_id: DbId,
    pub graded_count: i64,
    pub enrolled_count: i64,
}
