//! School (tenant) model.

use serde::Serialize;
use sqlx::FromRow;

use campus_core::types::{DbId, Timestamp};

/// A row from the `schools` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct School {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
