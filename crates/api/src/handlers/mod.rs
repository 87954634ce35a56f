//! HTTP handlers.
//!
//! Read handlers assemble derived views through the cache layer; mutation
//! handlers write through the repositories and then apply the central
//! invalidation table via [`crate::state::AppState::invalidate_for`].

pub mod attendance;
pub mod dashboard;
pub mod events;
pub mod fees;
pub mod gradebook;
pub mod messaging;

use sqlx::PgPool;

use campus_core::attendance::{AttendanceStatus, DayRecord};
use campus_core::error::CoreError;
use campus_core::fees::{InvoiceRow, InvoiceStatus};
use campus_core::grades::ResultRow;
use campus_core::roles::{ROLE_ADMIN, ROLE_PARENT, ROLE_STUDENT, ROLE_TEACHER};
use campus_core::types::DbId;
use campus_db::models::assessment::StudentResultRow;
use campus_db::models::attendance::AttendanceDayRow;
use campus_db::models::fee::FeeInvoice;
use campus_db::models::student::Student;
use campus_db::repositories::{ParentRepo, StudentRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Resolve a student and verify the caller may read their data.
///
/// Fails closed: cross-tenant ids read as not-found, and a parent or
/// student without ownership gets 403 rather than empty data.
pub(crate) async fn ensure_student_access(
    pool: &PgPool,
    auth: &AuthUser,
    student_id: DbId,
) -> AppResult<Student> {
    let student = StudentRepo::find_by_id(pool, student_id)
        .await?
        .filter(|s| s.school_id == auth.school_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Student",
            id: student_id,
        }))?;

    match auth.role.as_str() {
        ROLE_ADMIN | ROLE_TEACHER => Ok(student),
        ROLE_PARENT => {
            if ParentRepo::is_linked(pool, auth.user_id, student_id).await? {
                Ok(student)
            } else {
                Err(AppError::Core(CoreError::Forbidden(
                    "Not a parent of this student".into(),
                )))
            }
        }
        ROLE_STUDENT => {
            if student.user_id == auth.user_id {
                Ok(student)
            } else {
                Err(AppError::Core(CoreError::Forbidden(
                    "Students may only view their own records".into(),
                )))
            }
        }
        _ => Err(AppError::Core(CoreError::Forbidden(
            "Role may not view student records".into(),
        ))),
    }
}

/// Convert stored attendance rows into the aggregation input shape.
pub(crate) fn to_day_records(rows: &[AttendanceDayRow]) -> AppResult<Vec<DayRecord>> {
    rows.iter()
        .map(|row| {
            let status = AttendanceStatus::from_str_value(&row.status)
                .map_err(|e| AppError::Core(CoreError::Internal(e)))?;
            Ok(DayRecord {
                date: row.date,
                status,
            })
        })
        .collect()
}

/// Convert stored invoices into the fee summary input shape.
pub(crate) fn to_invoice_rows(invoices: &[FeeInvoice]) -> AppResult<Vec<InvoiceRow>> {
    invoices
        .iter()
        .map(|invoice| {
            let status = InvoiceStatus::from_str_value(&invoice.status)
                .map_err(|e| AppError::Core(CoreError::Internal(e)))?;
            Ok(InvoiceRow {
                student_id: invoice.student_id,
                amount_cents: invoice.amount_cents,
                due_date: invoice.due_date,
                status,
            })
        })
        .collect()
}

/// Convert stored results into the grade aggregation input shape.
pub(crate) fn to_result_rows(rows: &[StudentResultRow]) -> Vec<ResultRow> {
    rows.iter()
        .map(|row| ResultRow {
            subject_id: row.subject_id,
            subject_name: row.subject_name.clone(),
            marks_obtained: row.marks_obtained,
            total_marks: row.total_marks,
        })
        .collect()
}
