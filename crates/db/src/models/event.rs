//! Event and event approval models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campus_core::types::{DbId, Timestamp};

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub school_id: DbId,
    pub title: String,
    pub event_type: String,
    pub starts_at: Timestamp,
    pub deadline: Timestamp,
    /// Class-name tokens, or `["all"]`. Snapshotted at creation.
    pub target_audience: Vec<String>,
    pub requires_approval: bool,
    pub capacity: Option<i32>,
    pub fee_cents: i64,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an event.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub school_id: DbId,
    pub title: String,
    pub event_type: String,
    pub starts_at: Timestamp,
    pub deadline: Timestamp,
    pub target_audience: Vec<String>,
    pub requires_approval: bool,
    pub capacity: Option<i32>,
    pub fee_cents: i64,
    pub created_by: DbId,
}

/// A row from the `event_approvals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventApproval {
    pub id: DbId,
    pub event_id: DbId,
    pub student_id: DbId,
    pub parent_id: DbId,
    pub status: String,
    pub remarks: Option<String>,
    pub responded_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A pending approval joined with its event, for parent listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApprovalWithEvent {
    pub id: DbId,
    pub event_id: DbId,
    pub student_id: DbId,
    pub status: String,
    pub event_title: String,
    pub event_type: String,
    pub starts_at: Timestamp,
    pub deadline: Timestamp,
}
