//! Handlers for events, approval fan-out, and approval responses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use campus_cache::Mutation;
use campus_core::error::CoreError;
use campus_core::events::{
    approval_status_counts, is_urgent, ApprovalStatus, ApprovalStatusCounts,
};
use campus_core::targeting::{self, EnrolledStudent, ParentLink};
use campus_core::types::{DbId, Timestamp};
use campus_db::models::event::{CreateEvent, Event};
use campus_db::repositories::{ApprovalRepo, EventRepo, ParentRepo, StudentRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireParent};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body for POST /events.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub event_type: String,
    pub starts_at: Timestamp,
    pub deadline: Timestamp,
    /// Class-name tokens, or `["all"]` / empty for the whole school.
    #[serde(default)]
    pub target_audience: Vec<String>,
    #[serde(default)]
    pub requires_approval: bool,
    pub capacity: Option<i32>,
    pub fee_cents: Option<i64>,
}

/// Response for POST /events: the event plus fan-out accounting.
#[derive(Debug, Serialize)]
pub struct CreateEventResponse {
    pub event: Event,
    /// Students in targeting scope at creation time.
    pub students_in_scope: usize,
    /// Approval rows actually created (pairs already covered are skipped).
    pub approvals_created: u64,
}

/// Body for POST /approvals/{id}/respond.
#[derive(Debug, Deserialize)]
pub struct RespondApprovalRequest {
    /// `"approved"` or `"declined"`.
    pub status: String,
    pub remarks: Option<String>,
}

/// Response for GET /events/{id}/approvals.
#[derive(Debug, Serialize)]
pub struct EventApprovalsView {
    pub event_id: DbId,
    #[serde(flatten)]
    pub counts: ApprovalStatusCounts,
    pub urgent: bool,
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

/// The resolved fan-out scope for one event.
struct FanoutScope {
    student_ids: Vec<DbId>,
    pairs: Vec<(DbId, DbId)>,
}

/// Resolve the event's targeting rule against current enrollment and
/// expand to (student, parent) pairs.
async fn resolve_fanout_scope(pool: &PgPool, event: &Event) -> AppResult<FanoutScope> {
    let enrolled_rows = StudentRepo::enrolled_with_class(pool, event.school_id).await?;
    let enrolled: Vec<EnrolledStudent> = enrolled_rows
        .into_iter()
        .map(|row| EnrolledStudent {
            id: row.id,
            class_name: row.class_name,
        })
        .collect();

    let student_ids = targeting::resolve(&event.target_audience, &enrolled);

    let link_rows = ParentRepo::links_for_students(pool, &student_ids).await?;
    let links: Vec<ParentLink> = link_rows
        .into_iter()
        .map(|row| ParentLink {
            student_id: row.student_id,
            parent_id: row.parent_id,
        })
        .collect();

    let pairs = targeting::expand_pairs(&student_ids, &links);
    Ok(FanoutScope { student_ids, pairs })
}

/// Materialize PENDING approvals for every pair in scope.
///
/// Idempotent: pairs that already have a row for this event are skipped by
/// the store's uniqueness guard, so re-running after a partial failure
/// only fills the gap.
async fn fan_out_approvals(pool: &PgPool, event: &Event, scope: &FanoutScope) -> AppResult<u64> {
    let created = ApprovalRepo::bulk_create_pending(pool, event.id, &scope.pairs).await?;
    tracing::info!(
        event_id = event.id,
        pairs = scope.pairs.len(),
        created,
        "Approval fan-out complete"
    );
    Ok(created)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /events
///
/// Create an event; when it requires approval, materialize one PENDING
/// approval per targeted (student, parent) pair. The targeting rule is
/// snapshotted: later audience edits do not reconcile approvals.
pub async fn create_event(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateEventRequest>,
) -> AppResult<impl IntoResponse> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "title must not be empty".into(),
        )));
    }
    if let Some(capacity) = input.capacity {
        if capacity <= 0 {
            return Err(AppError::Core(CoreError::Validation(
                "capacity must be positive".into(),
            )));
        }
    }
    let fee_cents = input.fee_cents.unwrap_or(0);
    if fee_cents < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "fee_cents must not be negative".into(),
        )));
    }

    let event = EventRepo::create(
        &state.pool,
        &CreateEvent {
            school_id: auth.school_id,
            title: input.title,
            event_type: input.event_type,
            starts_at: input.starts_at,
            deadline: input.deadline,
            target_audience: input.target_audience,
            requires_approval: input.requires_approval,
            capacity: input.capacity,
            fee_cents,
            created_by: auth.user_id,
        },
    )
    .await?;

    let scope = resolve_fanout_scope(&state.pool, &event).await?;
    let approvals_created = if event.requires_approval {
        fan_out_approvals(&state.pool, &event, &scope).await?
    } else {
        0
    };

    let parent_ids: Vec<DbId> = {
        let mut ids: Vec<DbId> = scope.pairs.iter().map(|(_, p)| *p).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };

    state
        .invalidate_for(&Mutation::EventCreated {
            school_id: auth.school_id,
            student_ids: scope.student_ids.clone(),
            parent_ids,
        })
        .await;

    tracing::info!(
        user_id = auth.user_id,
        event_id = event.id,
        requires_approval = event.requires_approval,
        students_in_scope = scope.student_ids.len(),
        approvals_created,
        "Event created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreateEventResponse {
                students_in_scope: scope.student_ids.len(),
                approvals_created,
                event,
            },
        }),
    ))
}

/// POST /events/{event_id}/fanout
///
/// Re-run the approval fan-out for an event. Safe after a partial
/// failure: existing rows are skipped, only missing pairs are filled.
pub async fn rerun_fanout(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .filter(|e| e.school_id == auth.school_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }))?;

    if !event.requires_approval {
        return Err(AppError::Core(CoreError::Conflict(
            "Event does not require approval".into(),
        )));
    }

    let scope = resolve_fanout_scope(&state.pool, &event).await?;
    let approvals_created = fan_out_approvals(&state.pool, &event, &scope).await?;

    let parent_ids: Vec<DbId> = {
        let mut ids: Vec<DbId> = scope.pairs.iter().map(|(_, p)| *p).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    state
        .invalidate_for(&Mutation::EventCreated {
            school_id: auth.school_id,
            student_ids: scope.student_ids,
            parent_ids,
        })
        .await;

    Ok(Json(DataResponse {
        data: serde_json::json!({ "approvals_created": approvals_created }),
    }))
}

/// GET /events/{event_id}/approvals
///
/// Approval counts for one event, with the urgency classification.
pub async fn event_approvals(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .filter(|e| e.school_id == auth.school_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }))?;

    let statuses = ApprovalRepo::statuses_for_event(&state.pool, event.id)
        .await?
        .into_iter()
        .map(|s| {
            ApprovalStatus::from_str_value(&s).map_err(|e| AppError::Core(CoreError::Internal(e)))
        })
        .collect::<AppResult<Vec<_>>>()?;
    let counts = approval_status_counts(&statuses);

    Ok(Json(DataResponse {
        data: EventApprovalsView {
            event_id: event.id,
            counts,
            urgent: is_urgent(event.deadline, chrono::Utc::now()),
        },
    }))
}

/// POST /approvals/{approval_id}/respond
///
/// A parent approves or declines a pending approval. Answering an
/// already-answered approval is a conflict, not an overwrite.
pub async fn respond_approval(
    RequireParent(auth): RequireParent,
    State(state): State<AppState>,
    Path(approval_id): Path<DbId>,
    Json(input): Json<RespondApprovalRequest>,
) -> AppResult<impl IntoResponse> {
    let status = ApprovalStatus::from_str_value(&input.status)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    if status == ApprovalStatus::Pending {
        return Err(AppError::Core(CoreError::Validation(
            "Response must be approved or declined".into(),
        )));
    }

    let approval = ApprovalRepo::find_by_id(&state.pool, approval_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "EventApproval",
            id: approval_id,
        }))?;

    if approval.parent_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Approval belongs to another parent".into(),
        )));
    }

    let updated = ApprovalRepo::respond(
        &state.pool,
        approval.id,
        status.as_str(),
        input.remarks.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Approval has already been answered".into(),
        ))
    })?;

    state
        .invalidate_for(&Mutation::ApprovalResponded {
            school_id: auth.school_id,
            student_id: updated.student_id,
            parent_id: updated.parent_id,
        })
        .await;

    tracing::info!(
        user_id = auth.user_id,
        approval_id = updated.id,
        status = %updated.status,
        "Approval answered"
    );

    Ok(Json(DataResponse { data: updated }))
}
