//! The tag vocabulary and the mutation → tags invalidation table.
//!
//! Cached entries are labeled with entity tags for every entity whose rows
//! the view read (the owning profile, each child of a parent, each section
//! of a teacher) plus a view-kind tag. School-scoped rollup views carry the
//! `school-{id}` tag; per-person views do not, so a school-wide bust stays
//! surgical.
//!
//! Every write path maps "what changed" to "which tags to bust" through
//! [`tags_to_invalidate`]. Handlers never hand-roll tag lists; coverage
//! gaps would be invisible at the call sites.

use campus_core::messaging::SenderRole;
use campus_core::types::DbId;

// ---------------------------------------------------------------------------
// Tag constructors
// ---------------------------------------------------------------------------

pub fn school_tag(id: DbId) -> String {
    format!("school-{id}")
}

pub fn student_tag(id: DbId) -> String {
    format!("student-{id}")
}

pub fn teacher_tag(id: DbId) -> String {
    format!("teacher-{id}")
}

pub fn parent_tag(id: DbId) -> String {
    format!("parent-{id}")
}

pub fn section_tag(id: DbId) -> String {
    format!("section-{id}")
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// A write against the relational store, carrying the ids the invalidation
/// table needs. Variants name what happened, not which views exist.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// A teacher marked (or re-marked) attendance for a section.
    AttendanceMarked {
        school_id: DbId,
        section_id: DbId,
        teacher_id: DbId,
        student_ids: Vec<DbId>,
    },
    /// A result was recorded or overwritten for an assessment.
    ResultRecorded {
        school_id: DbId,
        teacher_id: DbId,
        student_id: DbId,
    },
    /// A fee invoice was paid.
    PaymentRecorded {
        school_id: DbId,
        student_id: DbId,
    },
    /// An event was created. Carries the resolved targeting scope so the
    /// bust reaches every dashboard that lists upcoming events or pending
    /// approvals.
    EventCreated {
        school_id: DbId,
        student_ids: Vec<DbId>,
        parent_ids: Vec<DbId>,
    },
    /// A parent answered an approval request.
    ApprovalResponded {
        school_id: DbId,
        student_id: DbId,
        parent_id: DbId,
    },
    /// A message was appended to a conversation.
    MessageSent {
        teacher_id: DbId,
        parent_id: DbId,
    },
    /// A viewer opened a thread, marking the counterpart's messages read.
    ConversationRead {
        viewer: SenderRole,
        teacher_id: DbId,
        parent_id: DbId,
    },
}

/// The single "what changed → which tags" table.
///
/// Tags cover every cached view that could have read the mutated rows:
/// the student's own views, parent views tagged with that child, teacher
/// views tagged with that section, and the school rollup. Reading a
/// conversation only affects the viewer's unread badges, so only the
/// viewer's tag is busted.
pub fn tags_to_invalidate(mutation: &Mutation) -> Vec<String> {
    match mutation {
        Mutation::AttendanceMarked {
            school_id,
            section_id,
            teacher_id,
            student_ids,
        } => {
            let mut tags = vec![
                school_tag(*school_id),
                section_tag(*section_id),
                teacher_tag(*teacher_id),
            ];
            tags.extend(student_ids.iter().map(|id| student_tag(*id)));
            tags
        }

        Mutation::ResultRecorded {
            school_id,
            teacher_id,
            student_id,
        } => vec![
            school_tag(*school_id),
            teacher_tag(*teacher_id),
            student_tag(*student_id),
        ],

        Mutation::PaymentRecorded {
            school_id,
            student_id,
        } => vec![school_tag(*school_id), student_tag(*student_id)],

        Mutation::EventCreated {
            school_id,
            student_ids,
            parent_ids,
        } => {
            let mut tags = vec![school_tag(*school_id)];
            tags.extend(student_ids.iter().map(|id| student_tag(*id)));
            tags.extend(parent_ids.iter().map(|id| parent_tag(*id)));
            tags
        }

        Mutation::ApprovalResponded {
            school_id,
            student_id,
            parent_id,
        } => vec![
            school_tag(*school_id),
            student_tag(*student_id),
            parent_tag(*parent_id),
        ],

        Mutation::MessageSent {
            teacher_id,
            parent_id,
        } => vec![teacher_tag(*teacher_id), parent_tag(*parent_id)],

        Mutation::ConversationRead {
            viewer,
            teacher_id,
            parent_id,
        } => match viewer {
            SenderRole::Teacher => vec![teacher_tag(*teacher_id)],
            SenderRole::Parent => vec![parent_tag(*parent_id)],
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_constructors_render_entity_prefixes() {
        assert_eq!(school_tag(1), "school-1");
        assert_eq!(student_tag(2), "student-2");
        assert_eq!(teacher_tag(3), "teacher-3");
        assert_eq!(parent_tag(4), "parent-4");
        assert_eq!(section_tag(5), "section-5");
    }

    #[test]
    fn attendance_covers_school_section_teacher_and_students() {
        let tags = tags_to_invalidate(&Mutation::AttendanceMarked {
            school_id: 1,
            section_id: 20,
            teacher_id: 300,
            student_ids: vec![7, 8],
        });

        assert_eq!(
            tags,
            vec!["school-1", "section-20", "teacher-300", "student-7", "student-8"]
        );
    }

    #[test]
    fn attendance_with_no_students_still_busts_section_views() {
        let tags = tags_to_invalidate(&Mutation::AttendanceMarked {
            school_id: 1,
            section_id: 20,
            teacher_id: 300,
            student_ids: vec![],
        });
        assert_eq!(tags, vec!["school-1", "section-20", "teacher-300"]);
    }

    #[test]
    fn result_covers_school_teacher_and_student() {
        let tags = tags_to_invalidate(&Mutation::ResultRecorded {
            school_id: 1,
            teacher_id: 300,
            student_id: 7,
        });
        assert_eq!(tags, vec!["school-1", "teacher-300", "student-7"]);
    }

    #[test]
    fn payment_covers_school_and_student() {
        let tags = tags_to_invalidate(&Mutation::PaymentRecorded {
            school_id: 1,
            student_id: 7,
        });
        // Parent dashboards are tagged with each child's student tag, so
        // `student-7` reaches them without naming the parents here.
        assert_eq!(tags, vec!["school-1", "student-7"]);
    }

    #[test]
    fn event_creation_covers_school_and_targeted_families() {
        let tags = tags_to_invalidate(&Mutation::EventCreated {
            school_id: 1,
            student_ids: vec![7],
            parent_ids: vec![40, 41],
        });
        assert_eq!(
            tags,
            vec!["school-1", "student-7", "parent-40", "parent-41"]
        );
    }

    #[test]
    fn event_without_targets_still_busts_school_rollups() {
        let tags = tags_to_invalidate(&Mutation::EventCreated {
            school_id: 1,
            student_ids: vec![],
            parent_ids: vec![],
        });
        assert_eq!(tags, vec!["school-1"]);
    }

    #[test]
    fn approval_response_covers_school_student_and_parent() {
        let tags = tags_to_invalidate(&Mutation::ApprovalResponded {
            school_id: 1,
            student_id: 7,
            parent_id: 40,
        });
        assert_eq!(tags, vec!["school-1", "student-7", "parent-40"]);
    }

    #[test]
    fn message_covers_both_participants() {
        let tags = tags_to_invalidate(&Mutation::MessageSent {
            teacher_id: 300,
            parent_id: 40,
        });
        assert_eq!(tags, vec!["teacher-300", "parent-40"]);
    }

    #[test]
    fn conversation_read_busts_only_the_viewer() {
        let read_by_teacher = tags_to_invalidate(&Mutation::ConversationRead {
            viewer: SenderRole::Teacher,
            teacher_id: 300,
            parent_id: 40,
        });
        assert_eq!(read_by_teacher, vec!["teacher-300"]);

        let read_by_parent = tags_to_invalidate(&Mutation::ConversationRead {
            viewer: SenderRole::Parent,
            teacher_id: 300,
            parent_id: 40,
        });
        assert_eq!(read_by_parent, vec!["parent-40"]);
    }

    #[test]
    fn every_mutation_yields_at_least_one_tag() {
        let mutations = vec![
            Mutation::AttendanceMarked {
                school_id: 1,
                section_id: 2,
                teacher_id: 3,
                student_ids: vec![],
            },
            Mutation::ResultRecorded {
                school_id: 1,
                teacher_id: 3,
                student_id: 4,
            },
            Mutation::PaymentRecorded {
                school_id: 1,
                student_id: 4,
            },
            Mutation::EventCreated {
                school_id: 1,
                student_ids: vec![],
                parent_ids: vec![],
            },
            Mutation::ApprovalResponded {
                school_id: 1,
                student_id: 4,
                parent_id: 5,
            },
            Mutation::MessageSent {
                teacher_id: 3,
                parent_id: 5,
            },
            Mutation::ConversationRead {
                viewer: SenderRole::Parent,
                teacher_id: 3,
                parent_id: 5,
            },
        ];

        for mutation in &mutations {
            assert!(
                !tags_to_invalidate(mutation).is_empty(),
                "no tags for {mutation:?}"
            );
        }
    }
}
