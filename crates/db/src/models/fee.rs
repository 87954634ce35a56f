//! Fee invoice model.

use serde::Serialize;
use sqlx::FromRow;

use campus_core::types::{Date, DbId, Timestamp};

/// A row from the `fee_invoices` table.
///
/// `status` is the stored status; consumers derive the read-time effective
/// status (PENDING past due reads as OVERDUE) through
/// `campus_core::fees::effective_status`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeeInvoice {
    pub id: DbId,
    pub school_id: DbId,
    pub student_id: DbId,
    pub title: String,
    pub amount_cents: i64,
    pub due_date: Date,
    pub status: String,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
