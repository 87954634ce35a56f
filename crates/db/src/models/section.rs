//! Section model.

use serde::Serialize;
use sqlx::FromRow;

use campus_core::types::{DbId, Timestamp};

/// A row from the `sections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Section {
    pub id: DbId,
    pub school_id: DbId,
    pub name: String,
    pub class_name: String,
    pub teacher_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
