//! Repository for the `assessments` and `assessment_results` tables.

use sqlx::PgPool;

use campus_core::types::DbId;

use crate::models::assessment::{
    Assessment, AssessmentResult, GradingProgressRow, RecordResult, StudentResultRow,
};

/// Column list for `assessments` queries.
const ASSESSMENT_COLUMNS: &str =
    "id, school_id, section_id, subject_id, title, total_marks, held_on, created_at, updated_at";

/// Column list for `assessment_results` queries.
const RESULT_COLUMNS: &str =
    "id, assessment_id, student_id, marks_obtained, grade, graded_by, created_at, updated_at";

/// Provides data access for assessments and their results.
pub struct AssessmentRepo;

impl AssessmentRepo {
    /// Find an assessment by id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Assessment>, sqlx::Error> {
        let query = format!("SELECT {ASSESSMENT_COLUMNS} FROM assessments WHERE id = $1");
        sqlx::query_as::<_, Assessment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record (or overwrite) one student's result for an assessment,
    /// keyed by `uq_results_assessment_student`.
    pub async fn record_result(
        pool: &PgPool,
        input: &RecordResult,
    ) -> Result<AssessmentResult, sqlx::Error> {
        let query = format!(
            "INSERT INTO assessment_results
                (assessment_id, student_id, marks_obtained, grade, graded_by)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (assessment_id, student_id) DO UPDATE SET
                marks_obtained = EXCLUDED.marks_obtained,
                grade = EXCLUDED.grade,
                graded_by = EXCLUDED.graded_by,
                updated_at = NOW()
             RETURNING {RESULT_COLUMNS}"
        );
        sqlx::query_as::<_, AssessmentResult>(&query)
            .bind(input.assessment_id)
            .bind(input.student_id)
            .bind(input.marks_obtained)
            .bind(&input.grade)
            .bind(input.graded_by)
            .fetch_one(pool)
            .await
    }

    /// All of a student's results joined with assessment and subject,
    /// the input shape for grade aggregation.
    pub async fn results_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<StudentResultRow>, sqlx::Error> {
        sqlx::query_as::<_, StudentResultRow>(
            "SELECT sub.id AS subject_id, sub.name AS subject_name,
                    r.marks_obtained, a.total_marks, r.grade
             FROM assessment_results r
             JOIN assessments a ON a.id = r.assessment_id
             JOIN subjects sub ON sub.id = a.subject_id
             WHERE r.student_id = $1
             ORDER BY r.created_at ASC",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }

    /// Grading progress for every assessment in a teacher's sections:
    /// recorded-result count versus enrolled-student count.
    pub async fn grading_progress_for_teacher(
        pool: &PgPool,
        teacher_id: DbId,
    ) -> Result<Vec<GradingProgressRow>, sqlx::Error> {
        sqlx::query_as::<_, GradingProgressRow>(
            "SELECT a.id AS assessment_id,
                    (SELECT COUNT(*) FROM assessment_results r
                     WHERE r.assessment_id = a.id) AS graded_count,
                    (SELECT COUNT(*) FROM students s
                     WHERE s.section_id = a.section_id) AS enrolled_count
             FROM assessments a
             JOIN sections sec ON sec.id = a.section_id
             WHERE sec.teacher_id = $1
             ORDER BY a.id ASC",
        )
        .bind(teacher_id)
        .fetch_all(pool)
        .await
    }

    /// Cohort average percentage across every graded result of a section,
    /// for the trend indicator. `None` when the section has no results.
    pub async fn cohort_average_pct(
        pool: &PgPool,
        section_id: DbId,
    ) -> Result<Option<f64>, sqlx::Error> {
        let row: (Option<f64>,) = sqlx::query_as(
            "SELECT AVG(100.0 * r.marks_obtained / a.total_marks)::DOUBLE PRECISION
             FROM assessment_results r
             JOIN assessments a ON a.id = r.assessment_id
             WHERE a.section_id = $1",
        )
        .bind(section_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
