//! Handlers for teacher-parent messaging.
//!
//! A conversation is resolved from its (student, teacher, parent) triple:
//! created together with its first message on first contact, appended to
//! thereafter. Opening a thread marks the counterpart's messages read, a
//! write triggered by a read, which also busts the viewer's cached lists.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use campus_cache::tags::{parent_tag, teacher_tag};
use campus_cache::{read_through, CacheKey, Mutation, ViewKind};
use campus_core::error::CoreError;
use campus_core::messaging::SenderRole;
use campus_core::roles::{ROLE_PARENT, ROLE_TEACHER};
use campus_core::types::{DbId, Timestamp};
use campus_db::models::conversation::{Conversation, ConversationTriple, Message};
use campus_db::repositories::{ConversationRepo, ParentRepo, StudentRepo, UserRepo};

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body for POST /conversations/messages.
///
/// The caller supplies the student and the counterpart; their own side of
/// the triple comes from the session.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub student_id: DbId,
    /// Required when a parent sends.
    pub teacher_id: Option<DbId>,
    /// Required when a teacher sends.
    pub parent_id: Option<DbId>,
    pub content: String,
}

/// Response for POST /conversations/messages.
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub conversation: Conversation,
    pub message: Message,
    /// Whether this send created the conversation.
    pub created_conversation: bool,
}

/// One conversation row in the cached list view.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationListItem {
    pub id: DbId,
    pub student_id: DbId,
    pub teacher_id: DbId,
    pub parent_id: DbId,
    pub updated_at: Timestamp,
    pub unread_count: i64,
}

/// The cached conversation list for one viewer.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationList {
    pub conversations: Vec<ConversationListItem>,
    pub total_unread: i64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The caller's messaging role, or 403 for roles that cannot message.
fn sender_role_of(auth: &AuthUser) -> AppResult<SenderRole> {
    match auth.role.as_str() {
        ROLE_TEACHER => Ok(SenderRole::Teacher),
        ROLE_PARENT => Ok(SenderRole::Parent),
        _ => Err(AppError::Core(CoreError::Forbidden(
            "Only teachers and parents exchange messages".into(),
        ))),
    }
}

/// Resolve and authorize the conversation triple for a send.
///
/// Fails closed: the student must be in the caller's school, the named
/// counterpart must hold the expected role in the same school, and a
/// parent sender must be linked to the student.
async fn resolve_triple(
    state: &AppState,
    auth: &AuthUser,
    input: &SendMessageRequest,
) -> AppResult<(SenderRole, ConversationTriple)> {
    let sender = sender_role_of(auth)?;

    let student = StudentRepo::find_by_id(&state.pool, input.student_id)
        .await?
        .filter(|s| s.school_id == auth.school_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Student",
            id: input.student_id,
        }))?;

    let (teacher_id, parent_id) = match sender {
        SenderRole::Teacher => {
            let parent_id = input.parent_id.ok_or(AppError::BadRequest(
                "parent_id is required when a teacher sends".into(),
            ))?;
            let parent = UserRepo::find_in_school(&state.pool, parent_id, auth.school_id)
                .await?
                .filter(|u| u.role == ROLE_PARENT)
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Parent",
                    id: parent_id,
                }))?;
            if !ParentRepo::is_linked(&state.pool, parent.id, student.id).await? {
                return Err(AppError::Core(CoreError::Validation(
                    "Parent is not linked to this student".into(),
                )));
            }
            (auth.user_id, parent.id)
        }
        SenderRole::Parent => {
            let teacher_id = input.teacher_id.ok_or(AppError::BadRequest(
                "teacher_id is required when a parent sends".into(),
            ))?;
            UserRepo::find_in_school(&state.pool, teacher_id, auth.school_id)
                .await?
                .filter(|u| u.role == ROLE_TEACHER)
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Teacher",
                    id: teacher_id,
                }))?;
            if !ParentRepo::is_linked(&state.pool, auth.user_id, student.id).await? {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Not a parent of this student".into(),
                )));
            }
            (teacher_id, auth.user_id)
        }
    };

    Ok((
        sender,
        ConversationTriple {
            student_id: student.id,
            teacher_id,
            parent_id,
        },
    ))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /conversations/messages
///
/// Send a message about a student. The triple resolves to its unique
/// conversation: the first contact creates conversation and message as
/// one unit, later sends append. Racing first sends collapse onto the
/// row the store kept.
pub async fn send_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SendMessageRequest>,
) -> AppResult<impl IntoResponse> {
    if input.content.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "content must not be empty".into(),
        )));
    }

    let (sender, triple) = resolve_triple(&state, &auth, &input).await?;

    let existing = ConversationRepo::find_by_triple(&state.pool, &triple).await?;
    let (conversation, message, created_conversation) = match existing {
        Some(conversation) => {
            let message = ConversationRepo::append_message(
                &state.pool,
                conversation.id,
                auth.user_id,
                sender.as_str(),
                &input.content,
            )
            .await?;
            (conversation, message, false)
        }
        None => {
            match ConversationRepo::create_with_first_message(
                &state.pool,
                auth.school_id,
                &triple,
                auth.user_id,
                sender.as_str(),
                &input.content,
            )
            .await
            {
                Ok((conversation, message)) => (conversation, message, true),
                // Lost the creation race: the triple now exists, append to it.
                Err(err) if is_unique_violation(&err, "uq_conversations_triple") => {
                    let conversation = ConversationRepo::find_by_triple(&state.pool, &triple)
                        .await?
                        .ok_or_else(|| {
                            AppError::InternalError(
                                "Conversation vanished after unique violation".into(),
                            )
                        })?;
                    let message = ConversationRepo::append_message(
                        &state.pool,
                        conversation.id,
                        auth.user_id,
                        sender.as_str(),
                        &input.content,
                    )
                    .await?;
                    (conversation, message, false)
                }
                Err(err) => return Err(err.into()),
            }
        }
    };

    state
        .invalidate_for(&Mutation::MessageSent {
            teacher_id: conversation.teacher_id,
            parent_id: conversation.parent_id,
        })
        .await;

    tracing::info!(
        user_id = auth.user_id,
        conversation_id = conversation.id,
        created_conversation,
        "Message sent"
    );

    let status = if created_conversation {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(DataResponse {
            data: SendMessageResponse {
                conversation,
                message,
                created_conversation,
            },
        }),
    ))
}

/// GET /conversations
///
/// The caller's conversations with unread counts, cached per viewer.
pub async fn list_conversations(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let viewer = sender_role_of(&auth)?;
    let viewer_id = auth.user_id;

    let (key, tags) = match viewer {
        SenderRole::Teacher => (
            CacheKey::new(ViewKind::Conversations, viewer_id),
            vec![teacher_tag(viewer_id)],
        ),
        SenderRole::Parent => (
            CacheKey::new(ViewKind::Conversations, viewer_id),
            vec![parent_tag(viewer_id)],
        ),
    };

    let pool = state.pool.clone();
    let view = read_through(state.cache.as_ref(), key, tags, || async move {
        let summaries = match viewer {
            SenderRole::Teacher => ConversationRepo::list_for_teacher(&pool, viewer_id).await?,
            SenderRole::Parent => ConversationRepo::list_for_parent(&pool, viewer_id).await?,
        };

        let conversations: Vec<ConversationListItem> = summaries
            .into_iter()
            .map(|s| ConversationListItem {
                id: s.id,
                student_id: s.student_id,
                teacher_id: s.teacher_id,
                parent_id: s.parent_id,
                updated_at: s.updated_at,
                unread_count: s.unread_count,
            })
            .collect();
        let total_unread = conversations.iter().map(|c| c.unread_count).sum();

        Ok::<_, AppError>(ConversationList {
            conversations,
            total_unread,
        })
    })
    .await?;

    Ok(Json(DataResponse { data: view }))
}

/// GET /conversations/{conversation_id}/messages
///
/// Open a thread: return its messages and mark the counterpart's unread
/// messages read. The viewer's cached lists are invalidated so unread
/// badges update; the counterpart's unread state is untouched.
pub async fn open_conversation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(conversation_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let viewer = sender_role_of(&auth)?;

    let conversation = ConversationRepo::find_by_id(&state.pool, conversation_id)
        .await?
        .filter(|c| c.school_id == auth.school_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Conversation",
            id: conversation_id,
        }))?;

    let is_participant = match viewer {
        SenderRole::Teacher => conversation.teacher_id == auth.user_id,
        SenderRole::Parent => conversation.parent_id == auth.user_id,
    };
    if !is_participant {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not a participant in this conversation".into(),
        )));
    }

    let counterpart = viewer.opposite();
    let marked = ConversationRepo::mark_read(
        &state.pool,
        conversation.id,
        counterpart.as_str(),
    )
    .await?;

    if marked > 0 {
        state
            .invalidate_for(&Mutation::ConversationRead {
                viewer,
                teacher_id: conversation.teacher_id,
                parent_id: conversation.parent_id,
            })
            .await;
    }

    let messages = ConversationRepo::messages(&state.pool, conversation.id).await?;

    Ok(Json(DataResponse { data: messages }))
}
