//! Conversation and message models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campus_core::types::{DbId, Timestamp};

/// A row from the `conversations` table.
///
/// The (student_id, teacher_id, parent_id) triple is the conversation's
/// identity; `uq_conversations_triple` guarantees at most one row per
/// triple.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Conversation {
    pub id: DbId,
    pub school_id: DbId,
    pub student_id: DbId,
    pub teacher_id: DbId,
    pub parent_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub conversation_id: DbId,
    pub sender_id: DbId,
    pub sender_role: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// DTO identifying a conversation by its triple.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ConversationTriple {
    pub student_id: DbId,
    pub teacher_id: DbId,
    pub parent_id: DbId,
}

/// A conversation joined with its unread count for one viewer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversationSummary {
    pub id: DbId,
    pub student_id: DbId,
    pub teacher_id: DbId,
    pub parent_id: DbId,
    pub updated_at: Timestamp,
    pub unread_count: i64,
}
