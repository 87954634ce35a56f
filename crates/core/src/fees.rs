//! Fee invoice status resolution and summary computation.
//!
//! The stored invoice status can lag reality: an invoice still PENDING in
//! storage whose due date has passed is OVERDUE at read time. Every
//! consumer must go through [`effective_status`] so no two code paths
//! disagree on what "overdue" means. Amounts are integer minor currency
//! units (cents).

use serde::{Deserialize, Serialize};

use crate::types::{Date, DbId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Valid invoice status strings (stored in `fee_invoices.status`).
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PAID: &str = "paid";
pub const STATUS_OVERDUE: &str = "overdue";
pub const STATUS_CANCELLED: &str = "cancelled";

/// All valid invoice status strings.
pub const VALID_INVOICE_STATUSES: &[&str] =
    &[STATUS_PENDING, STATUS_PAID, STATUS_OVERDUE, STATUS_CANCELLED];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Status of a fee invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_PAID => Ok(Self::Paid),
            STATUS_OVERDUE => Ok(Self::Overdue),
            STATUS_CANCELLED => Ok(Self::Cancelled),
            _ => Err(format!(
                "Invalid invoice status '{s}'. Must be one of: {}",
                VALID_INVOICE_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Paid => STATUS_PAID,
            Self::Overdue => STATUS_OVERDUE,
            Self::Cancelled => STATUS_CANCELLED,
        }
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// One invoice, reduced to the fields summary computation needs.
#[derive(Debug, Clone)]
pub struct InvoiceRow {
    pub student_id: DbId,
    pub amount_cents: i64,
    pub due_date: Date,
    pub status: InvoiceStatus,
}

/// Count and amount total for one status bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTotal {
    pub count: u32,
    pub amount_cents: i64,
}

/// Invoices partitioned by effective status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSummary {
    pub pending: BucketTotal,
    pub paid: BucketTotal,
    pub overdue: BucketTotal,
    pub cancelled: BucketTotal,
}

/// Fee summary for one child, used on parent dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildFeeSummary {
    pub student_id: DbId,
    #[serde(flatten)]
    pub summary: FeeSummary,
}

// ---------------------------------------------------------------------------
// Computation functions
// ---------------------------------------------------------------------------

/// The single read-time status rule.
///
/// A PENDING invoice whose due date is strictly before `today` reads as
/// OVERDUE even if not persisted as such. All other statuses pass through.
pub fn effective_status(stored: InvoiceStatus, due_date: Date, today: Date) -> InvoiceStatus {
    match stored {
        InvoiceStatus::Pending if due_date < today => InvoiceStatus::Overdue,
        other => other,
    }
}

/// Partition invoices into status buckets using [`effective_status`].
pub fn summarize(invoices: &[InvoiceRow], today: Date) -> FeeSummary {
    let mut summary = FeeSummary::default();

    for invoice in invoices {
        let bucket = match effective_status(invoice.status, invoice.due_date, today) {
            InvoiceStatus::Pending => &mut summary.pending,
            InvoiceStatus::Paid => &mut summary.paid,
            InvoiceStatus::Overdue => &mut summary.overdue,
            InvoiceStatus::Cancelled => &mut summary.cancelled,
        };
        bucket.count += 1;
        bucket.amount_cents += invoice.amount_cents;
    }

    summary
}

/// Per-child fee summaries for a parent with one or more children.
///
/// Children are ordered by student id ascending.
pub fn per_child_summary(invoices: &[InvoiceRow], today: Date) -> Vec<ChildFeeSummary> {
    let mut by_student: std::collections::BTreeMap<DbId, Vec<InvoiceRow>> =
        std::collections::BTreeMap::new();

    for invoice in invoices {
        by_student
            .entry(invoice.student_id)
            .or_default()
            .push(invoice.clone());
    }

    by_student
        .into_iter()
        .map(|(student_id, rows)| ChildFeeSummary {
            student_id,
            summary: summarize(&rows, today),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(student_id: DbId, cents: i64, due: Date, status: InvoiceStatus) -> InvoiceRow {
        InvoiceRow {
            student_id,
            amount_cents: cents,
            due_date: due,
            status,
        }
    }

    // -- InvoiceStatus ----------------------------------------------------

    #[test]
    fn status_round_trip() {
        for status in &[
            InvoiceStatus::Pending,
            InvoiceStatus::Paid,
            InvoiceStatus::Overdue,
            InvoiceStatus::Cancelled,
        ] {
            assert_eq!(
                InvoiceStatus::from_str_value(status.as_str()).unwrap(),
                *status
            );
        }
    }

    #[test]
    fn status_invalid_rejected() {
        assert!(InvoiceStatus::from_str_value("unpaid").is_err());
    }

    // -- effective_status -------------------------------------------------

    #[test]
    fn pending_past_due_reads_overdue() {
        let status = effective_status(
            InvoiceStatus::Pending,
            date(2026, 3, 1),
            date(2026, 3, 2),
        );
        assert_eq!(status, InvoiceStatus::Overdue);
    }

    #[test]
    fn pending_due_today_stays_pending() {
        let today = date(2026, 3, 2);
        assert_eq!(
            effective_status(InvoiceStatus::Pending, today, today),
            InvoiceStatus::Pending
        );
    }

    #[test]
    fn pending_due_tomorrow_stays_pending() {
        assert_eq!(
            effective_status(InvoiceStatus::Pending, date(2026, 3, 3), date(2026, 3, 2)),
            InvoiceStatus::Pending
        );
    }

    #[test]
    fn paid_past_due_stays_paid() {
        assert_eq!(
            effective_status(InvoiceStatus::Paid, date(2026, 1, 1), date(2026, 3, 2)),
            InvoiceStatus::Paid
        );
    }

    #[test]
    fn cancelled_past_due_stays_cancelled() {
        assert_eq!(
            effective_status(InvoiceStatus::Cancelled, date(2026, 1, 1), date(2026, 3, 2)),
            InvoiceStatus::Cancelled
        );
    }

    // -- summarize --------------------------------------------------------

    #[test]
    fn empty_invoices_yield_default_summary() {
        let summary = summarize(&[], date(2026, 3, 2));
        assert_eq!(summary, FeeSummary::default());
    }

    #[test]
    fn buckets_sum_counts_and_amounts() {
        let today = date(2026, 3, 2);
        let invoices = vec![
            invoice(1, 10_000, date(2026, 4, 1), InvoiceStatus::Pending),
            invoice(1, 5_000, date(2026, 4, 1), InvoiceStatus::Pending),
            invoice(1, 7_500, date(2026, 2, 1), InvoiceStatus::Paid),
            invoice(1, 2_000, date(2026, 2, 1), InvoiceStatus::Cancelled),
        ];

        let summary = summarize(&invoices, today);
        assert_eq!(summary.pending.count, 2);
        assert_eq!(summary.pending.amount_cents, 15_000);
        assert_eq!(summary.paid.count, 1);
        assert_eq!(summary.paid.amount_cents, 7_500);
        assert_eq!(summary.cancelled.count, 1);
        assert_eq!(summary.overdue.count, 0);
    }

    #[test]
    fn stored_pending_past_due_lands_in_overdue_bucket() {
        // Due yesterday, still PENDING in storage.
        let invoices = vec![invoice(1, 10_000, date(2026, 3, 1), InvoiceStatus::Pending)];

        let summary = summarize(&invoices, date(2026, 3, 2));
        assert_eq!(summary.pending.count, 0);
        assert_eq!(summary.overdue.count, 1);
        assert_eq!(summary.overdue.amount_cents, 10_000);
    }

    #[test]
    fn persisted_overdue_also_lands_in_overdue_bucket() {
        let invoices = vec![
            invoice(1, 1_000, date(2026, 3, 1), InvoiceStatus::Overdue),
            invoice(1, 2_000, date(2026, 3, 1), InvoiceStatus::Pending),
        ];

        let summary = summarize(&invoices, date(2026, 3, 2));
        assert_eq!(summary.overdue.count, 2);
        assert_eq!(summary.overdue.amount_cents, 3_000);
    }

    // -- per_child_summary ------------------------------------------------

    #[test]
    fn per_child_partitions_by_student() {
        let today = date(2026, 3, 2);
        let invoices = vec![
            invoice(7, 10_000, date(2026, 4, 1), InvoiceStatus::Pending),
            invoice(9, 5_000, date(2026, 4, 1), InvoiceStatus::Paid),
            invoice(7, 3_000, date(2026, 2, 1), InvoiceStatus::Pending),
        ];

        let children = per_child_summary(&invoices, today);
        assert_eq!(children.len(), 2);

        assert_eq!(children[0].student_id, 7);
        assert_eq!(children[0].summary.pending.count, 1);
        assert_eq!(children[0].summary.overdue.count, 1);

        assert_eq!(children[1].student_id, 9);
        assert_eq!(children[1].summary.paid.amount_cents, 5_000);
    }

    #[test]
    fn per_child_empty_is_empty() {
        assert!(per_child_summary(&[], date(2026, 3, 2)).is_empty());
    }
}
