//! Role-scoped dashboard handlers.
//!
//! Each endpoint resolves the caller's profile server-side, then assembles
//! its view through the cache layer: on a miss the aggregation runs against
//! fresh store reads and the result is stored under the entity's tags.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use campus_cache::tags::{parent_tag, school_tag, section_tag, student_tag, teacher_tag};
use campus_cache::{read_through, CacheKey, ViewKind};
use campus_core::attendance::{self, AttendanceStats, MonthlyAttendance};
use campus_core::dashboard::{self, GradingProgress, SchoolCounts};
use campus_core::error::CoreError;
use campus_core::events::is_urgent;
use campus_core::fees::{self, ChildFeeSummary, FeeSummary};
use campus_core::grades::{self, OverallAggregate, Trend};
use campus_core::types::{DbId, Timestamp};
use campus_db::models::event::Event;
use campus_db::repositories::{
    ApprovalRepo, AssessmentRepo, AttendanceRepo, ConversationRepo, EventRepo, FeeRepo,
    ParentRepo, SchoolRepo, SectionRepo, StudentRepo,
};

use crate::error::{AppError, AppResult};
use crate::handlers::{to_day_records, to_invoice_rows, to_result_rows};
use crate::middleware::rbac::{RequireAdmin, RequireParent, RequireStudent, RequireTeacher};
use crate::response::DataResponse;
use crate::state::AppState;

/// How many upcoming events dashboards list.
const UPCOMING_EVENTS_LIMIT: i64 = 5;

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

/// A compact event row for dashboard listings.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: DbId,
    pub title: String,
    pub event_type: String,
    pub starts_at: Timestamp,
    pub deadline: Timestamp,
}

impl From<Event> for EventSummary {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            event_type: event.event_type,
            starts_at: event.starts_at,
            deadline: event.deadline,
        }
    }
}

/// The student dashboard aggregate.
#[derive(Debug, Serialize, Deserialize)]
pub struct StudentDashboard {
    pub attendance: AttendanceStats,
    pub monthly_attendance: Vec<MonthlyAttendance>,
    pub grades: Option<OverallAggregate>,
    /// Against the section cohort; absent when either side has no data.
    pub trend: Option<Trend>,
    pub fees: FeeSummary,
    pub upcoming_events: Vec<EventSummary>,
}

/// A section the teacher still needs to mark today.
#[derive(Debug, Serialize, Deserialize)]
pub struct SectionBrief {
    pub id: DbId,
    pub name: String,
}

/// The teacher dashboard aggregate.
#[derive(Debug, Serialize, Deserialize)]
pub struct TeacherDashboard {
    pub sections_missing_attendance: Vec<SectionBrief>,
    pub assessments_needing_grading: Vec<DbId>,
    pub unread_messages: i64,
}

/// One child's rollup on the parent dashboard.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChildOverview {
    pub student_id: DbId,
    pub full_name: String,
    pub class_name: Option<String>,
    pub attendance: AttendanceStats,
    pub grades: Option<OverallAggregate>,
}

/// A pending approval with its urgency flag.
#[derive(Debug, Serialize, Deserialize)]
pub struct PendingApprovalView {
    pub id: DbId,
    pub event_id: DbId,
    pub student_id: DbId,
    pub event_title: String,
    pub event_type: String,
    pub starts_at: Timestamp,
    pub deadline: Timestamp,
    /// Deadline within the urgency window and not yet passed.
    pub urgent: bool,
}

/// The parent dashboard aggregate.
#[derive(Debug, Serialize, Deserialize)]
pub struct ParentDashboard {
    pub children: Vec<ChildOverview>,
    pub fees: Vec<ChildFeeSummary>,
    pub pending_approvals: Vec<PendingApprovalView>,
    pub unread_messages: i64,
}

/// The admin dashboard aggregate.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub counts: SchoolCounts,
    pub attendance_coverage_pct: u8,
    pub fees: FeeSummary,
    pub events_pending_approval: i64,
    pub upcoming_events: Vec<EventSummary>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /dashboard/student
///
/// The caller's own dashboard; the student profile is resolved from the
/// session subject, never from client input.
pub async fn student_dashboard(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let student = StudentRepo::find_by_user_id(&state.pool, auth.user_id)
        .await?
        .filter(|s| s.school_id == auth.school_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Student",
            id: auth.user_id,
        }))?;

    let key = CacheKey::new(ViewKind::Dashboard, student.id);
    let tags = vec![student_tag(student.id)];
    let pool = state.pool.clone();

    let view = read_through(state.cache.as_ref(), key, tags, || async move {
        compute_student_dashboard(&pool, student.id, student.section_id, auth.school_id).await
    })
    .await?;

    Ok(Json(DataResponse { data: view }))
}

async fn compute_student_dashboard(
    pool: &campus_db::DbPool,
    student_id: DbId,
    section_id: Option<DbId>,
    school_id: DbId,
) -> AppResult<StudentDashboard> {
    let now = chrono::Utc::now();
    let today = now.date_naive();

    let attendance_rows = AttendanceRepo::list_for_student(pool, student_id).await?;
    let records = to_day_records(&attendance_rows)?;

    let result_rows = AssessmentRepo::results_for_student(pool, student_id).await?;
    let results = to_result_rows(&result_rows);
    let overall = grades::overall(&results);

    let trend = match (&overall, section_id) {
        (Some(agg), Some(section_id)) => AssessmentRepo::cohort_average_pct(pool, section_id)
            .await?
            .map(|cohort| grades::classify_trend(agg.average, cohort.round() as u8)),
        _ => None,
    };

    let invoices = FeeRepo::list_for_student(pool, student_id).await?;
    let invoice_rows = to_invoice_rows(&invoices)?;

    let upcoming = upcoming_event_summaries(pool, school_id, now).await?;

    Ok(StudentDashboard {
        attendance: attendance::compute_stats(&records),
        monthly_attendance: attendance::monthly_breakdown(&records),
        grades: overall,
        trend,
        fees: fees::summarize(&invoice_rows, today),
        upcoming_events: upcoming,
    })
}

/// Fetch and project upcoming events for dashboard listings.
async fn upcoming_event_summaries(
    pool: &campus_db::DbPool,
    school_id: DbId,
    now: Timestamp,
) -> AppResult<Vec<EventSummary>> {
    let events = EventRepo::upcoming_for_school(pool, school_id, now, UPCOMING_EVENTS_LIMIT)
        .await?;
    Ok(events.into_iter().map(EventSummary::from).collect())
}

/// GET /dashboard/teacher
pub async fn teacher_dashboard(
    RequireTeacher(auth): RequireTeacher,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let teacher_id = auth.user_id;
    let sections = SectionRepo::list_for_teacher(&state.pool, teacher_id).await?;

    let key = CacheKey::new(ViewKind::Dashboard, teacher_id);
    let mut tags = vec![teacher_tag(teacher_id)];
    tags.extend(sections.iter().map(|s| section_tag(s.id)));

    let pool = state.pool.clone();
    let view = read_through(state.cache.as_ref(), key, tags, || async move {
        let today = chrono::Utc::now().date_naive();

        let section_ids: Vec<DbId> = sections.iter().map(|s| s.id).collect();
        let marked = AttendanceRepo::marked_section_ids_on(&pool, &section_ids, today).await?;
        let missing_ids = dashboard::sections_missing_attendance(&section_ids, &marked);
        let sections_missing_attendance = sections
            .iter()
            .filter(|s| missing_ids.contains(&s.id))
            .map(|s| SectionBrief {
                id: s.id,
                name: s.name.clone(),
            })
            .collect();

        let progress_rows = AssessmentRepo::grading_progress_for_teacher(&pool, teacher_id)
            .await?;
        let progress: Vec<GradingProgress> = progress_rows
            .iter()
            .map(|row| GradingProgress {
                assessment_id: row.assessment_id,
                graded_count: row.graded_count,
                enrolled_count: row.enrolled_count,
            })
            .collect();

        let unread = ConversationRepo::unread_total_for_teacher(&pool, teacher_id).await?;

        Ok::<_, AppError>(TeacherDashboard {
            sections_missing_attendance,
            assessments_needing_grading: dashboard::assessments_needing_grading(&progress),
            unread_messages: unread,
        })
    })
    .await?;

    Ok(Json(DataResponse { data: view }))
}

/// GET /dashboard/parent
pub async fn parent_dashboard(
    RequireParent(auth): RequireParent,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let parent_id = auth.user_id;
    let children = ParentRepo::children_of(&state.pool, parent_id).await?;

    let key = CacheKey::new(ViewKind::Dashboard, parent_id);
    let mut tags = vec![parent_tag(parent_id)];
    tags.extend(children.iter().map(|c| student_tag(c.id)));

    let pool = state.pool.clone();
    let view = read_through(state.cache.as_ref(), key, tags, || async move {
        let now = chrono::Utc::now();
        let today = now.date_naive();

        let mut overviews = Vec::with_capacity(children.len());
        for child in &children {
            let attendance_rows = AttendanceRepo::list_for_student(&pool, child.id).await?;
            let records = to_day_records(&attendance_rows)?;

            let result_rows = AssessmentRepo::results_for_student(&pool, child.id).await?;
            let results = to_result_rows(&result_rows);

            overviews.push(ChildOverview {
                student_id: child.id,
                full_name: child.full_name.clone(),
                class_name: child.class_name.clone(),
                attendance: attendance::compute_stats(&records),
                grades: grades::overall(&results),
            });
        }

        let child_ids: Vec<DbId> = children.iter().map(|c| c.id).collect();
        let invoices = FeeRepo::list_for_students(&pool, &child_ids).await?;
        let invoice_rows = to_invoice_rows(&invoices)?;

        let pending = ApprovalRepo::pending_for_parent(&pool, parent_id).await?;
        let pending_approvals = pending
            .into_iter()
            .map(|a| PendingApprovalView {
                urgent: is_urgent(a.deadline, now),
                id: a.id,
                event_id: a.event_id,
                student_id: a.student_id,
                event_title: a.event_title,
                event_type: a.event_type,
                starts_at: a.starts_at,
                deadline: a.deadline,
            })
            .collect();

        let unread = ConversationRepo::unread_total_for_parent(&pool, parent_id).await?;

        Ok::<_, AppError>(ParentDashboard {
            children: overviews,
            fees: fees::per_child_summary(&invoice_rows, today),
            pending_approvals,
            unread_messages: unread,
        })
    })
    .await?;

    Ok(Json(DataResponse { data: view }))
}

/// GET /dashboard/admin
pub async fn admin_dashboard(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let school_id = auth.school_id;

    let key = CacheKey::new(ViewKind::Dashboard, school_id);
    let tags = vec![school_tag(school_id)];

    let pool = state.pool.clone();
    let view = read_through(state.cache.as_ref(), key, tags, || async move {
        let now = chrono::Utc::now();
        let today = now.date_naive();

        let (students, teachers, sections) = SchoolRepo::headcounts(&pool, school_id).await?;
        let marked_today =
            AttendanceRepo::sections_marked_in_school_on(&pool, school_id, today).await?;
        let counts = SchoolCounts {
            students,
            teachers,
            sections,
            sections_marked_today: marked_today,
        };
        let attendance_coverage_pct = counts.attendance_coverage_pct();

        let invoices = FeeRepo::list_for_school(&pool, school_id).await?;
        let invoice_rows = to_invoice_rows(&invoices)?;

        let events_pending_approval = ApprovalRepo::events_with_pending(&pool, school_id).await?;
        let upcoming = upcoming_event_summaries(&pool, school_id, now).await?;

        Ok::<_, AppError>(AdminDashboard {
            counts,
            attendance_coverage_pct,
            fees: fees::summarize(&invoice_rows, today),
            events_pending_approval,
            upcoming_events: upcoming,
        })
    })
    .await?;

    Ok(Json(DataResponse { data: view }))
}
