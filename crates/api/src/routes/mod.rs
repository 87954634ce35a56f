pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /dashboard/student                     student dashboard (GET)
/// /dashboard/teacher                     teacher dashboard (GET)
/// /dashboard/parent                      parent dashboard (GET)
/// /dashboard/admin                       admin dashboard (GET)
///
/// /students/{id}/attendance              attendance history (GET)
/// /students/{id}/gradebook               gradebook (GET)
/// /students/{id}/fees                    invoices + summary (GET)
///
/// /attendance                            bulk mark a section's day (POST)
/// /assessments/{id}/results              record a result (POST)
/// /fees/{id}/payments                    record a payment (POST)
///
/// /events                                create event + fan-out (POST)
/// /events/{id}/fanout                    re-run fan-out (POST)
/// /events/{id}/approvals                 approval counts (GET)
/// /approvals/{id}/respond                answer an approval (POST)
///
/// /conversations                         list with unread counts (GET)
/// /conversations/messages                send / start conversation (POST)
/// /conversations/{id}/messages           open thread, mark read (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // -- Dashboards --
        .route(
            "/dashboard/student",
            get(handlers::dashboard::student_dashboard),
        )
        .route(
            "/dashboard/teacher",
            get(handlers::dashboard::teacher_dashboard),
        )
        .route(
            "/dashboard/parent",
            get(handlers::dashboard::parent_dashboard),
        )
        .route(
            "/dashboard/admin",
            get(handlers::dashboard::admin_dashboard),
        )
        // -- Student-scoped views --
        .route(
            "/students/{student_id}/attendance",
            get(handlers::attendance::attendance_history),
        )
        .route(
            "/students/{student_id}/gradebook",
            get(handlers::gradebook::gradebook),
        )
        .route(
            "/students/{student_id}/fees",
            get(handlers::fees::student_fees),
        )
        // -- Mutations --
        .route("/attendance", post(handlers::attendance::mark_attendance))
        .route(
            "/assessments/{assessment_id}/results",
            post(handlers::gradebook::record_result),
        )
        .route(
            "/fees/{invoice_id}/payments",
            post(handlers::fees::record_payment),
        )
        // -- Events and approvals --
        .route("/events", post(handlers::events::create_event))
        .route(
            "/events/{event_id}/fanout",
            post(handlers::events::rerun_fanout),
        )
        .route(
            "/events/{event_id}/approvals",
            get(handlers::events::event_approvals),
        )
        .route(
            "/approvals/{approval_id}/respond",
            post(handlers::events::respond_approval),
        )
        // -- Messaging --
        .route(
            "/conversations",
            get(handlers::messaging::list_conversations),
        )
        .route(
            "/conversations/messages",
            post(handlers::messaging::send_message),
        )
        .route(
            "/conversations/{conversation_id}/messages",
            get(handlers::messaging::open_conversation),
        )
}
