//! Repository for the `attendance_records` table.

use sqlx::PgPool;

use campus_core::types::{Date, DbId};

use crate::models::attendance::{AttendanceDayRow, AttendanceRecord, MarkAttendance};

/// Column list for `attendance_records` queries.
const COLUMNS: &str =
    "id, school_id, student_id, section_id, date, status, marked_by, created_at, updated_at";

/// Provides data access for attendance records.
pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Upsert one student's mark for one date.
    ///
    /// Re-marking a date updates the existing row in place, keyed by
    /// `uq_attendance_student_date`; marks never duplicate.
    pub async fn upsert_mark(
        pool: &PgPool,
        input: &MarkAttendance,
    ) -> Result<AttendanceRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance_records
                (school_id, student_id, section_id, date, status, marked_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (student_id, date) DO UPDATE SET
                status = EXCLUDED.status,
                section_id = EXCLUDED.section_id,
                marked_by = EXCLUDED.marked_by,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AttendanceRecord>(&query)
            .bind(input.school_id)
            .bind(input.student_id)
            .bind(input.section_id)
            .bind(input.date)
            .bind(&input.status)
            .bind(input.marked_by)
            .fetch_one(pool)
            .await
    }

    /// All of a student's records, oldest first, the input shape for
    /// stats and the monthly breakdown.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<AttendanceDayRow>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceDayRow>(
            "SELECT date, status FROM attendance_records
             WHERE student_id = $1
             ORDER BY date ASC",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }

    /// Which of the given sections have at least one record on `date`.
    pub async fn marked_section_ids_on(
        pool: &PgPool,
        section_ids: &[DbId],
        date: Date,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT DISTINCT section_id FROM attendance_records
             WHERE section_id = ANY($1) AND date = $2",
        )
        .bind(section_ids)
        .bind(date)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// How many of a school's sections have any record dated `date`.
    pub async fn sections_marked_in_school_on(
        pool: &PgPool,
        school_id: DbId,
        date: Date,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT section_id) FROM attendance_records
             WHERE school_id = $1 AND date = $2",
        )
        .bind(school_id)
        .bind(date)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
