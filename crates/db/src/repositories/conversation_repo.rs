//! Repository for the `conversations` and `messages` tables.

use sqlx::PgPool;

use campus_core::types::DbId;

use crate::models::conversation::{
    Conversation, ConversationSummary, ConversationTriple, Message,
};

/// Column list for `conversations` queries.
const CONVERSATION_COLUMNS: &str =
    "id, school_id, student_id, teacher_id, parent_id, created_at, updated_at";

/// Column list for `messages` queries.
const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_id, sender_role, content, is_read, created_at";

/// Provides data access for conversations and messages.
pub struct ConversationRepo;

impl ConversationRepo {
    /// Find the unique conversation for a (student, teacher, parent)
    /// triple.
    pub async fn find_by_triple(
        pool: &PgPool,
        triple: &ConversationTriple,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations
             WHERE student_id = $1 AND teacher_id = $2 AND parent_id = $3"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(triple.student_id)
            .bind(triple.teacher_id)
            .bind(triple.parent_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a conversation by id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1");
        sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a conversation and its first message as one transaction.
    ///
    /// A conversation never normally exists with zero messages. If a
    /// racing request created the triple first, the unique violation
    /// surfaces as `sqlx::Error`; the caller re-resolves the triple and
    /// appends instead.
    pub async fn create_with_first_message(
        pool: &PgPool,
        school_id: DbId,
        triple: &ConversationTriple,
        sender_id: DbId,
        sender_role: &str,
        content: &str,
    ) -> Result<(Conversation, Message), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let conversation_query = format!(
            "INSERT INTO conversations (school_id, student_id, teacher_id, parent_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {CONVERSATION_COLUMNS}"
        );
        let conversation = sqlx::query_as::<_, Conversation>(&conversation_query)
            .bind(school_id)
            .bind(triple.student_id)
            .bind(triple.teacher_id)
            .bind(triple.parent_id)
            .fetch_one(&mut *tx)
            .await?;

        let message_query = format!(
            "INSERT INTO messages (conversation_id, sender_id, sender_role, content)
             VALUES ($1, $2, $3, $4)
             RETURNING {MESSAGE_COLUMNS}"
        );
        let message = sqlx::query_as::<_, Message>(&message_query)
            .bind(conversation.id)
            .bind(sender_id)
            .bind(sender_role)
            .bind(content)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((conversation, message))
    }

    /// Append a message to an existing conversation and bump its
    /// `updated_at` for list ordering, as one transaction.
    pub async fn append_message(
        pool: &PgPool,
        conversation_id: DbId,
        sender_id: DbId,
        sender_role: &str,
        content: &str,
    ) -> Result<Message, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let message_query = format!(
            "INSERT INTO messages (conversation_id, sender_id, sender_role, content)
             VALUES ($1, $2, $3, $4)
             RETURNING {MESSAGE_COLUMNS}"
        );
        let message = sqlx::query_as::<_, Message>(&message_query)
            .bind(conversation_id)
            .bind(sender_id)
            .bind(sender_role)
            .bind(content)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE conversations SET updated_at = NOW() WHERE id = $1")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(message)
    }

    /// All messages of a conversation, oldest first.
    pub async fn messages(
        pool: &PgPool,
        conversation_id: DbId,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE conversation_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .fetch_all(pool)
            .await
    }

    /// Mark every unread message from `counterpart_role` as read.
    ///
    /// Called when the opposite role opens the thread. Returns the number
    /// of messages flipped.
    pub async fn mark_read(
        pool: &PgPool,
        conversation_id: DbId,
        counterpart_role: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = TRUE
             WHERE conversation_id = $1 AND sender_role = $2 AND is_read = FALSE",
        )
        .bind(conversation_id)
        .bind(counterpart_role)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// A teacher's conversations with per-conversation unread counts,
    /// most recently active first.
    pub async fn list_for_teacher(
        pool: &PgPool,
        teacher_id: DbId,
    ) -> Result<Vec<ConversationSummary>, sqlx::Error> {
        sqlx::query_as::<_, ConversationSummary>(
            "SELECT c.id, c.student_id, c.teacher_id, c.parent_id, c.updated_at,
                    COUNT(m.id) FILTER (
                        WHERE m.sender_role = 'parent' AND m.is_read = FALSE
                    ) AS unread_count
             FROM conversations c
             LEFT JOIN messages m ON m.conversation_id = c.id
             WHERE c.teacher_id = $1
             GROUP BY c.id
             ORDER BY c.updated_at DESC",
        )
        .bind(teacher_id)
        .fetch_all(pool)
        .await
    }

    /// A parent's conversations with per-conversation unread counts,
    /// most recently active first.
    pub async fn list_for_parent(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<Vec<ConversationSummary>, sqlx::Error> {
        sqlx::query_as::<_, ConversationSummary>(
            "SELECT c.id, c.student_id, c.teacher_id, c.parent_id, c.updated_at,
                    COUNT(m.id) FILTER (
                        WHERE m.sender_role = 'teacher' AND m.is_read = FALSE
                    ) AS unread_count
             FROM conversations c
             LEFT JOIN messages m ON m.conversation_id = c.id
             WHERE c.parent_id = $1
             GROUP BY c.id
             ORDER BY c.updated_at DESC",
        )
        .bind(parent_id)
        .fetch_all(pool)
        .await
    }

    /// Total unread messages across all of a teacher's conversations.
    pub async fn unread_total_for_teacher(
        pool: &PgPool,
        teacher_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*)
             FROM messages m
             JOIN conversations c ON c.id = m.conversation_id
             WHERE c.teacher_id = $1
               AND m.sender_role = 'parent'
               AND m.is_read = FALSE",
        )
        .bind(teacher_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Total unread messages across all of a parent's conversations.
    pub async fn unread_total_for_parent(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*)
             FROM messages m
             JOIN conversations c ON c.id = m.conversation_id
             WHERE c.parent_id = $1
               AND m.sender_role = 'teacher'
               AND m.is_read = FALSE",
        )
        .bind(parent_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
