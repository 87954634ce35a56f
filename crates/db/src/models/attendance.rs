//! Attendance record model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campus_core::types::{Date, DbId, Timestamp};

/// A row from the `attendance_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceRecord {
    pub id: DbId,
    pub school_id: DbId,
    pub student_id: DbId,
    pub section_id: DbId,
    pub date: Date,
    pub status: String,
    pub marked_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for marking one student's attendance on one date.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkAttendance {
    pub school_id: DbId,
    pub student_id: DbId,
    pub section_id: DbId,
    pub date: Date,
    pub status: String,
    pub marked_by: DbId,
}

/// The reduced row shape attendance aggregation reads.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceDayRow {
    pub date: Date,
    pub status: String,
}
