//! Repository for the `fee_invoices` table.

use sqlx::PgPool;

use campus_core::types::DbId;

use crate::models::fee::FeeInvoice;

/// Column list for `fee_invoices` queries.
const COLUMNS: &str = "id, school_id, student_id, title, amount_cents, due_date, status, \
    paid_at, created_at, updated_at";

/// Provides data access for fee invoices.
pub struct FeeRepo;

impl FeeRepo {
    /// Find an invoice by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FeeInvoice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fee_invoices WHERE id = $1");
        sqlx::query_as::<_, FeeInvoice>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All invoices of one student, newest due date first.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<FeeInvoice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fee_invoices
             WHERE student_id = $1
             ORDER BY due_date DESC"
        );
        sqlx::query_as::<_, FeeInvoice>(&query)
            .bind(student_id)
            .fetch_all(pool)
            .await
    }

    /// All invoices across a set of students (a parent's children).
    pub async fn list_for_students(
        pool: &PgPool,
        student_ids: &[DbId],
    ) -> Result<Vec<FeeInvoice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fee_invoices
             WHERE student_id = ANY($1)
             ORDER BY student_id ASC, due_date DESC"
        );
        sqlx::query_as::<_, FeeInvoice>(&query)
            .bind(student_ids)
            .fetch_all(pool)
            .await
    }

    /// Mark an invoice paid.
    ///
    /// Only PENDING or OVERDUE invoices transition; paying a PAID or
    /// CANCELLED invoice returns `None` and the caller reports a conflict.
    pub async fn mark_paid(
        pool: &PgPool,
        invoice_id: DbId,
    ) -> Result<Option<FeeInvoice>, sqlx::Error> {
        let query = format!(
            "UPDATE fee_invoices SET
                status = 'paid',
                paid_at = NOW(),
                updated_at = NOW()
             WHERE id = $1 AND status IN ('pending', 'overdue')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeeInvoice>(&query)
            .bind(invoice_id)
            .fetch_optional(pool)
            .await
    }

    /// Every invoice of a school, for admin rollups. Read-time OVERDUE
    /// classification of past-due PENDING rows happens in the aggregation
    /// layer, which is why this returns raw rows rather than grouping by
    /// the stored status.
    pub async fn list_for_school(
        pool: &PgPool,
        school_id: DbId,
    ) -> Result<Vec<FeeInvoice>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fee_invoices
             WHERE school_id = $1
             ORDER BY due_date DESC"
        );
        sqlx::query_as::<_, FeeInvoice>(&query)
            .bind(school_id)
            .fetch_all(pool)
            .await
    }
}
