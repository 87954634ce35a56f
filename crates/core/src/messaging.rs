//! Messaging roles and unread-count computation.
//!
//! A conversation is identified by its (student, teacher, parent) triple;
//! only the teacher and the parent exchange messages. Unread state is
//! tracked per message and read from the viewer's perspective: a message
//! is unread for a viewer when it was sent by the opposite role and has
//! not been marked read.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Valid sender role strings (stored in `messages.sender_role`).
pub const SENDER_TEACHER: &str = "teacher";
pub const SENDER_PARENT: &str = "parent";

/// All valid sender role strings.
pub const VALID_SENDER_ROLES: &[&str] = &[SENDER_TEACHER, SENDER_PARENT];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which side of a conversation sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    Teacher,
    Parent,
}

impl SenderRole {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            SENDER_TEACHER => Ok(Self::Teacher),
            SENDER_PARENT => Ok(Self::Parent),
            _ => Err(format!(
                "Invalid sender role '{s}'. Must be one of: {}",
                VALID_SENDER_ROLES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teacher => SENDER_TEACHER,
            Self::Parent => SENDER_PARENT,
        }
    }

    /// The other side of the conversation.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Teacher => Self::Parent,
            Self::Parent => Self::Teacher,
        }
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// One message, reduced to the fields unread computation needs.
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub sender_role: SenderRole,
    pub is_read: bool,
}

// ---------------------------------------------------------------------------
// Computation functions
// ---------------------------------------------------------------------------

/// Unread count for a viewer: messages sent by the opposite role that are
/// not yet read. The viewer's own messages never count.
pub fn unread_count(messages: &[MessageRow], viewer: SenderRole) -> u32 {
    let counterpart = viewer.opposite();
    messages
        .iter()
        .filter(|m| m.sender_role == counterpart && !m.is_read)
        .count() as u32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(sender_role: SenderRole, is_read: bool) -> MessageRow {
        MessageRow {
            sender_role,
            is_read,
        }
    }

    // -- SenderRole -------------------------------------------------------

    #[test]
    fn role_round_trip() {
        for role in &[SenderRole::Teacher, SenderRole::Parent] {
            assert_eq!(SenderRole::from_str_value(role.as_str()).unwrap(), *role);
        }
    }

    #[test]
    fn role_invalid_rejected() {
        let result = SenderRole::from_str_value("student");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid sender role"));
    }

    #[test]
    fn opposite_is_involutive() {
        assert_eq!(SenderRole::Teacher.opposite(), SenderRole::Parent);
        assert_eq!(SenderRole::Parent.opposite(), SenderRole::Teacher);
        assert_eq!(SenderRole::Teacher.opposite().opposite(), SenderRole::Teacher);
    }

    // -- unread_count -----------------------------------------------------

    #[test]
    fn empty_thread_has_no_unread() {
        assert_eq!(unread_count(&[], SenderRole::Teacher), 0);
    }

    #[test]
    fn only_counterpart_unread_messages_count() {
        let messages = vec![
            msg(SenderRole::Parent, false),
            msg(SenderRole::Parent, true),
            msg(SenderRole::Teacher, false),
        ];

        // Teacher viewing: one unread parent message.
        assert_eq!(unread_count(&messages, SenderRole::Teacher), 1);
        // Parent viewing: one unread teacher message.
        assert_eq!(unread_count(&messages, SenderRole::Parent), 1);
    }

    #[test]
    fn own_unread_messages_never_count() {
        let messages = vec![
            msg(SenderRole::Teacher, false),
            msg(SenderRole::Teacher, false),
        ];
        assert_eq!(unread_count(&messages, SenderRole::Teacher), 0);
        assert_eq!(unread_count(&messages, SenderRole::Parent), 2);
    }

    #[test]
    fn read_messages_do_not_count() {
        let messages = vec![msg(SenderRole::Parent, true), msg(SenderRole::Parent, true)];
        assert_eq!(unread_count(&messages, SenderRole::Teacher), 0);
    }
}
