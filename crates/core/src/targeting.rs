//! Event targeting resolution and approval pair expansion.
//!
//! Targeting rules are lists of class-name tokens (e.g. `"Grade 7"`) or
//! the `"all"` sentinel. Matching is by exact class-name string; renaming
//! a class changes which students future events target, which is accepted
//! behavior. The rule is snapshotted at event creation: editing it later
//! does not reconcile existing approval rows.

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Sentinel audience token meaning "every enrolled student in the school".
pub const AUDIENCE_ALL: &str = "all";

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// One enrolled student with the class name their section belongs to.
#[derive(Debug, Clone)]
pub struct EnrolledStudent {
    pub id: DbId,
    pub class_name: String,
}

/// One student-parent link.
#[derive(Debug, Clone)]
pub struct ParentLink {
    pub student_id: DbId,
    pub parent_id: DbId,
}

// ---------------------------------------------------------------------------
// Resolution functions
// ---------------------------------------------------------------------------

/// Resolve a targeting rule to the set of student ids in scope.
///
/// An empty audience or one containing [`AUDIENCE_ALL`] matches every
/// enrolled student; otherwise students whose class name appears in the
/// audience token list match. Order follows the enrolled list.
pub fn resolve(target_audience: &[String], enrolled: &[EnrolledStudent]) -> Vec<DbId> {
    let everyone = target_audience.is_empty()
        || target_audience.iter().any(|token| token == AUDIENCE_ALL);

    enrolled
        .iter()
        .filter(|student| {
            everyone || target_audience.iter().any(|token| *token == student.class_name)
        })
        .map(|student| student.id)
        .collect()
}

/// Expand in-scope students to deduplicated (student, parent) pairs.
///
/// Students with no linked parent contribute no pairs. Duplicate links
/// collapse to a single pair, matching the one-approval-per-triple
/// invariant downstream.
pub fn expand_pairs(students_in_scope: &[DbId], links: &[ParentLink]) -> Vec<(DbId, DbId)> {
    let scope: std::collections::HashSet<DbId> = students_in_scope.iter().copied().collect();
    let mut seen: std::collections::HashSet<(DbId, DbId)> = std::collections::HashSet::new();
    let mut pairs = Vec::new();

    for link in links {
        if !scope.contains(&link.student_id) {
            continue;
        }
        let pair = (link.student_id, link.parent_id);
        if seen.insert(pair) {
            pairs.push(pair);
        }
    }

    pairs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: DbId, class_name: &str) -> EnrolledStudent {
        EnrolledStudent {
            id,
            class_name: class_name.to_string(),
        }
    }

    fn link(student_id: DbId, parent_id: DbId) -> ParentLink {
        ParentLink {
            student_id,
            parent_id,
        }
    }

    // -- resolve ----------------------------------------------------------

    #[test]
    fn all_sentinel_matches_everyone() {
        let enrolled = vec![student(1, "Grade 7"), student(2, "Grade 8")];
        let scope = resolve(&["all".to_string()], &enrolled);
        assert_eq!(scope, vec![1, 2]);
    }

    #[test]
    fn empty_audience_matches_everyone() {
        let enrolled = vec![student(1, "Grade 7"), student(2, "Grade 8")];
        assert_eq!(resolve(&[], &enrolled), vec![1, 2]);
    }

    #[test]
    fn class_tokens_match_by_name() {
        let enrolled = vec![
            student(1, "Grade 7"),
            student(2, "Grade 8"),
            student(3, "Grade 7"),
        ];

        let scope = resolve(&["Grade 7".to_string()], &enrolled);
        assert_eq!(scope, vec![1, 3]);
    }

    #[test]
    fn multiple_tokens_union() {
        let enrolled = vec![
            student(1, "Grade 7"),
            student(2, "Grade 8"),
            student(3, "Grade 9"),
        ];

        let scope = resolve(&["Grade 7".to_string(), "Grade 9".to_string()], &enrolled);
        assert_eq!(scope, vec![1, 3]);
    }

    #[test]
    fn all_alongside_tokens_still_matches_everyone() {
        let enrolled = vec![student(1, "Grade 7"), student(2, "Grade 8")];
        let scope = resolve(&["Grade 7".to_string(), "all".to_string()], &enrolled);
        assert_eq!(scope, vec![1, 2]);
    }

    #[test]
    fn unknown_token_matches_nobody() {
        let enrolled = vec![student(1, "Grade 7")];
        assert!(resolve(&["Grade 12".to_string()], &enrolled).is_empty());
    }

    #[test]
    fn class_match_is_exact() {
        let enrolled = vec![student(1, "Grade 7")];
        assert!(resolve(&["grade 7".to_string()], &enrolled).is_empty());
        assert!(resolve(&["Grade 7 ".to_string()], &enrolled).is_empty());
    }

    #[test]
    fn no_enrolled_students_yields_empty_scope() {
        assert!(resolve(&["all".to_string()], &[]).is_empty());
    }

    // -- expand_pairs -----------------------------------------------------

    #[test]
    fn pairs_for_each_linked_parent() {
        let links = vec![link(1, 10), link(1, 11), link(2, 12)];
        let pairs = expand_pairs(&[1, 2], &links);
        assert_eq!(pairs, vec![(1, 10), (1, 11), (2, 12)]);
    }

    #[test]
    fn out_of_scope_students_skipped() {
        let links = vec![link(1, 10), link(2, 12)];
        let pairs = expand_pairs(&[1], &links);
        assert_eq!(pairs, vec![(1, 10)]);
    }

    #[test]
    fn students_without_parents_contribute_nothing() {
        let pairs = expand_pairs(&[1, 2], &[link(2, 12)]);
        assert_eq!(pairs, vec![(2, 12)]);
    }

    #[test]
    fn duplicate_links_collapse() {
        let links = vec![link(1, 10), link(1, 10)];
        let pairs = expand_pairs(&[1], &links);
        assert_eq!(pairs, vec![(1, 10)]);
    }

    #[test]
    fn two_students_one_parent_each() {
        // Event targeting Grade 7 with 2 enrolled students, 1 parent each:
        // exactly 2 pairs.
        let enrolled = vec![student(1, "Grade 7"), student(2, "Grade 7")];
        let scope = resolve(&["Grade 7".to_string()], &enrolled);
        let pairs = expand_pairs(&scope, &[link(1, 10), link(2, 11)]);
        assert_eq!(pairs.len(), 2);
    }
}
