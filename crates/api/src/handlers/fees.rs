//! Handlers for the fees view and payment recording.
//!
//! Payments are recorded, not processed; gateway integration lives
//! elsewhere. Every status shown to a caller is the read-time effective
//! status, so an invoice past its due date reads OVERDUE even while the
//! stored row still says PENDING.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use campus_cache::tags::student_tag;
use campus_cache::{read_through, CacheKey, Mutation, ViewKind};
use campus_core::error::CoreError;
use campus_core::fees::{self, FeeSummary, InvoiceStatus};
use campus_core::types::{Date, DbId, Timestamp};
use campus_db::repositories::FeeRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::{ensure_student_access, to_invoice_rows};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

/// One invoice with its effective status resolved.
#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceView {
    pub id: DbId,
    pub title: String,
    pub amount_cents: i64,
    pub due_date: Date,
    pub status: InvoiceStatus,
    pub paid_at: Option<Timestamp>,
}

/// The fees view for one student.
#[derive(Debug, Serialize, Deserialize)]
pub struct StudentFees {
    pub student_id: DbId,
    pub invoices: Vec<InvoiceView>,
    pub summary: FeeSummary,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /students/{student_id}/fees
///
/// Invoice list with effective statuses plus the bucket summary, cached
/// per student.
pub async fn student_fees(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let student = ensure_student_access(&state.pool, &auth, student_id).await?;

    let key = CacheKey::new(ViewKind::Fees, student.id);
    let tags = vec![student_tag(student.id)];
    let pool = state.pool.clone();

    let view = read_through(state.cache.as_ref(), key, tags, || async move {
        let today = chrono::Utc::now().date_naive();
        let invoices = FeeRepo::list_for_student(&pool, student.id).await?;
        let rows = to_invoice_rows(&invoices)?;

        let views = invoices
            .iter()
            .zip(rows.iter())
            .map(|(invoice, row)| InvoiceView {
                id: invoice.id,
                title: invoice.title.clone(),
                amount_cents: invoice.amount_cents,
                due_date: invoice.due_date,
                status: fees::effective_status(row.status, row.due_date, today),
                paid_at: invoice.paid_at,
            })
            .collect();

        Ok::<_, AppError>(StudentFees {
            student_id: student.id,
            invoices: views,
            summary: fees::summarize(&rows, today),
        })
    })
    .await?;

    Ok(Json(DataResponse { data: view }))
}

/// POST /fees/{invoice_id}/payments
///
/// Record a payment against an invoice. Only PENDING or OVERDUE invoices
/// transition; anything else is a conflict. Admin only.
pub async fn record_payment(
    RequireAdmin(auth): RequireAdmin,
    State(state): State<AppState>,
    Path(invoice_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let invoice = FeeRepo::find_by_id(&state.pool, invoice_id)
        .await?
        .filter(|i| i.school_id == auth.school_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FeeInvoice",
            id: invoice_id,
        }))?;

    let paid = FeeRepo::mark_paid(&state.pool, invoice.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Invoice {} is {} and cannot be paid",
                invoice.id, invoice.status
            )))
        })?;

    state
        .invalidate_for(&Mutation::PaymentRecorded {
            school_id: auth.school_id,
            student_id: paid.student_id,
        })
        .await;

    tracing::info!(
        user_id = auth.user_id,
        invoice_id = paid.id,
        student_id = paid.student_id,
        amount_cents = paid.amount_cents,
        "Payment recorded"
    );

    Ok(Json(DataResponse { data: paid }))
}
