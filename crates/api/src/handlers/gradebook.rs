//! Handlers for the gradebook view and result recording.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use campus_cache::tags::student_tag;
use campus_cache::{read_through, CacheKey, Mutation, ViewKind};
use campus_core::error::CoreError;
use campus_core::grades::{self, OverallAggregate, SubjectAggregate};
use campus_core::types::DbId;
use campus_db::models::assessment::RecordResult;
use campus_db::repositories::{AssessmentRepo, SectionRepo, StudentRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::{ensure_student_access, to_result_rows};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireTeacher;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body for POST /assessments/{id}/results.
#[derive(Debug, Deserialize)]
pub struct RecordResultRequest {
    pub student_id: DbId,
    pub marks_obtained: i32,
}

/// The gradebook view for one student.
#[derive(Debug, Serialize, Deserialize)]
pub struct Gradebook {
    pub student_id: DbId,
    pub subjects: Vec<SubjectAggregate>,
    pub overall: Option<OverallAggregate>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /assessments/{assessment_id}/results
///
/// Record (or overwrite) one student's marks. The percentage is always
/// derived from the assessment's total marks at read time; only the raw
/// marks and the letter grade are stored.
pub async fn record_result(
    RequireTeacher(auth): RequireTeacher,
    State(state): State<AppState>,
    Path(assessment_id): Path<DbId>,
    Json(input): Json<RecordResultRequest>,
) -> AppResult<impl IntoResponse> {
    let assessment = AssessmentRepo::find_by_id(&state.pool, assessment_id)
        .await?
        .filter(|a| a.school_id == auth.school_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Assessment",
            id: assessment_id,
        }))?;

    let section = SectionRepo::find_by_id(&state.pool, assessment.section_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Section",
            id: assessment.section_id,
        }))?;

    if section.teacher_id != Some(auth.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Assessment belongs to another teacher's section".into(),
        )));
    }

    if input.marks_obtained < 0 || input.marks_obtained > assessment.total_marks {
        return Err(AppError::Core(CoreError::Validation(format!(
            "marks_obtained must be between 0 and {}",
            assessment.total_marks
        ))));
    }

    let enrolled = StudentRepo::ids_in_section(&state.pool, assessment.section_id).await?;
    if !enrolled.contains(&input.student_id) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Student {} is not enrolled in section {}",
            input.student_id, assessment.section_id
        ))));
    }

    let pct = grades::percentage(input.marks_obtained, assessment.total_marks);
    let record = RecordResult {
        assessment_id,
        student_id: input.student_id,
        marks_obtained: input.marks_obtained,
        grade: grades::letter(pct).to_string(),
        graded_by: auth.user_id,
    };
    let result = AssessmentRepo::record_result(&state.pool, &record).await?;

    state
        .invalidate_for(&Mutation::ResultRecorded {
            school_id: auth.school_id,
            teacher_id: auth.user_id,
            student_id: input.student_id,
        })
        .await;

    tracing::info!(
        user_id = auth.user_id,
        assessment_id,
        student_id = input.student_id,
        marks = input.marks_obtained,
        "Result recorded"
    );

    Ok(Json(DataResponse { data: result }))
}

/// GET /students/{student_id}/gradebook
///
/// Subject-wise and overall aggregates, cached per student. Empty
/// gradebooks report an absent overall aggregate, never a zero average.
pub async fn gradebook(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let student = ensure_student_access(&state.pool, &auth, student_id).await?;

    let key = CacheKey::new(ViewKind::Gradebook, student.id);
    let tags = vec![student_tag(student.id)];
    let pool = state.pool.clone();

    let view = read_through(state.cache.as_ref(), key, tags, || async move {
        let rows = AssessmentRepo::results_for_student(&pool, student.id).await?;
        let results = to_result_rows(&rows);

        Ok::<_, AppError>(Gradebook {
            student_id: student.id,
            subjects: grades::subject_breakdown(&results),
            overall: grades::overall(&results),
        })
    })
    .await?;

    Ok(Json(DataResponse { data: view }))
}
