//! Handlers for marking attendance and reading attendance history.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use campus_cache::tags::student_tag;
use campus_cache::{read_through, CacheKey, Mutation, ViewKind};
use campus_core::attendance::{self, AttendanceStats, AttendanceStatus, MonthlyAttendance};
use campus_core::error::CoreError;
use campus_core::types::{Date, DbId};
use campus_db::models::attendance::MarkAttendance;
use campus_db::repositories::{AttendanceRepo, SectionRepo, StudentRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::{ensure_student_access, to_day_records};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireTeacher;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// One student's mark in a bulk attendance submission.
#[derive(Debug, Deserialize)]
pub struct StudentMark {
    pub student_id: DbId,
    pub status: String,
}

/// Body for POST /attendance: one section, one date, many marks.
#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub section_id: DbId,
    pub date: Date,
    pub marks: Vec<StudentMark>,
}

/// Response for POST /attendance.
#[derive(Debug, Serialize)]
pub struct MarkAttendanceResponse {
    pub marked: usize,
}

/// The attendance history view for one student.
#[derive(Debug, Serialize, Deserialize)]
pub struct AttendanceHistory {
    pub student_id: DbId,
    pub stats: AttendanceStats,
    pub monthly: Vec<MonthlyAttendance>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /attendance
///
/// Bulk-upsert a section's marks for one date. Re-marking a date updates
/// rows in place; it never duplicates. Requires the teacher assigned to
/// the section.
pub async fn mark_attendance(
    RequireTeacher(auth): RequireTeacher,
    State(state): State<AppState>,
    Json(input): Json<MarkAttendanceRequest>,
) -> AppResult<impl IntoResponse> {
    if input.marks.is_empty() {
        return Err(AppError::BadRequest("marks must not be empty".into()));
    }

    let section = SectionRepo::find_by_id(&state.pool, input.section_id)
        .await?
        .filter(|s| s.school_id == auth.school_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Section",
            id: input.section_id,
        }))?;

    if section.teacher_id != Some(auth.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Section is not assigned to this teacher".into(),
        )));
    }

    // Validate statuses and section membership before writing anything.
    for mark in &input.marks {
        AttendanceStatus::from_str_value(&mark.status)
            .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    }

    let enrolled = StudentRepo::ids_in_section(&state.pool, input.section_id).await?;
    for mark in &input.marks {
        if !enrolled.contains(&mark.student_id) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Student {} is not enrolled in section {}",
                mark.student_id, input.section_id
            ))));
        }
    }

    let mut student_ids = Vec::with_capacity(input.marks.len());
    for mark in &input.marks {
        let record = MarkAttendance {
            school_id: auth.school_id,
            student_id: mark.student_id,
            section_id: input.section_id,
            date: input.date,
            status: mark.status.clone(),
            marked_by: auth.user_id,
        };
        AttendanceRepo::upsert_mark(&state.pool, &record).await?;
        student_ids.push(mark.student_id);
    }

    state
        .invalidate_for(&Mutation::AttendanceMarked {
            school_id: auth.school_id,
            section_id: input.section_id,
            teacher_id: auth.user_id,
            student_ids,
        })
        .await;

    tracing::info!(
        user_id = auth.user_id,
        section_id = input.section_id,
        date = %input.date,
        marked = input.marks.len(),
        "Attendance marked"
    );

    Ok(Json(DataResponse {
        data: MarkAttendanceResponse {
            marked: input.marks.len(),
        },
    }))
}

/// GET /students/{student_id}/attendance
///
/// Stats plus the six-month breakdown, cached per student.
pub async fn attendance_history(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let student = ensure_student_access(&state.pool, &auth, student_id).await?;

    let key = CacheKey::new(ViewKind::AttendanceHistory, student.id);
    let tags = vec![student_tag(student.id)];
    let pool = state.pool.clone();

    let view = read_through(state.cache.as_ref(), key, tags, || async move {
        let rows = AttendanceRepo::list_for_student(&pool, student.id).await?;
        let records = to_day_records(&rows)?;

        Ok::<_, AppError>(AttendanceHistory {
            student_id: student.id,
            stats: attendance::compute_stats(&records),
            monthly: attendance::monthly_breakdown(&records),
        })
    })
    .await?;

    Ok(Json(DataResponse { data: view }))
}
