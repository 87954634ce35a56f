//! User model. Teachers, parents, and admins are users; students also
//! have a profile row in `students`.

use serde::Serialize;
use sqlx::FromRow;

use campus_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub school_id: DbId,
    pub full_name: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
