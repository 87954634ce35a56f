//! Repository for the `event_approvals` table.

use sqlx::PgPool;

use campus_core::types::DbId;

use crate::models::event::{ApprovalWithEvent, EventApproval};

/// Column list for `event_approvals` queries.
const COLUMNS: &str =
    "id, event_id, student_id, parent_id, status, remarks, responded_at, created_at";

/// Provides data access for event approval records.
pub struct ApprovalRepo;

impl ApprovalRepo {
    /// Bulk-create PENDING approvals for (student, parent) pairs.
    ///
    /// Pairs that already have a row for this event are skipped via
    /// `uq_event_approvals_triple`, so a retried or re-run fan-out never
    /// duplicates rows. Returns the number actually inserted.
    pub async fn bulk_create_pending(
        pool: &PgPool,
        event_id: DbId,
        pairs: &[(DbId, DbId)],
    ) -> Result<u64, sqlx::Error> {
        if pairs.is_empty() {
            return Ok(0);
        }

        let student_ids: Vec<DbId> = pairs.iter().map(|(s, _)| *s).collect();
        let parent_ids: Vec<DbId> = pairs.iter().map(|(_, p)| *p).collect();

        let result = sqlx::query(
            "INSERT INTO event_approvals (event_id, student_id, parent_id)
             SELECT $1, pair.student_id, pair.parent_id
             FROM UNNEST($2::BIGINT[], $3::BIGINT[]) AS pair(student_id, parent_id)
             ON CONFLICT ON CONSTRAINT uq_event_approvals_triple DO NOTHING",
        )
        .bind(event_id)
        .bind(&student_ids)
        .bind(&parent_ids)
        .execute(pool)
        .await?;

        tracing::debug!(
            event_id,
            requested = pairs.len(),
            inserted = result.rows_affected(),
            "Approval fan-out batch applied"
        );
        Ok(result.rows_affected())
    }

    /// Find an approval by id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EventApproval>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM event_approvals WHERE id = $1");
        sqlx::query_as::<_, EventApproval>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record a parent's response on a PENDING approval.
    ///
    /// Returns `None` when the approval is no longer pending; answering
    /// twice is a conflict the caller reports.
    pub async fn respond(
        pool: &PgPool,
        approval_id: DbId,
        status: &str,
        remarks: Option<&str>,
    ) -> Result<Option<EventApproval>, sqlx::Error> {
        let query = format!(
            "UPDATE event_approvals SET
                status = $2,
                remarks = $3,
                responded_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EventApproval>(&query)
            .bind(approval_id)
            .bind(status)
            .bind(remarks)
            .fetch_optional(pool)
            .await
    }

    /// A parent's pending approvals joined with their events, soonest
    /// deadline first.
    pub async fn pending_for_parent(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<Vec<ApprovalWithEvent>, sqlx::Error> {
        sqlx::query_as::<_, ApprovalWithEvent>(
            "SELECT ea.id, ea.event_id, ea.student_id, ea.status,
                    e.title AS event_title, e.event_type, e.starts_at, e.deadline
             FROM event_approvals ea
             JOIN events e ON e.id = ea.event_id
             WHERE ea.parent_id = $1 AND ea.status = 'pending'
             ORDER BY e.deadline ASC",
        )
        .bind(parent_id)
        .fetch_all(pool)
        .await
    }

    /// The raw status strings of every approval for one event, the input
    /// shape for status-count aggregation.
    pub async fn statuses_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT status FROM event_approvals WHERE event_id = $1")
                .bind(event_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(status,)| status).collect())
    }

    /// Number of a school's events that still have pending approvals.
    pub async fn events_with_pending(
        pool: &PgPool,
        school_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT ea.event_id)
             FROM event_approvals ea
             JOIN events e ON e.id = ea.event_id
             WHERE e.school_id = $1 AND ea.status = 'pending'",
        )
        .bind(school_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
