//! Role-specific dashboard count computation.
//!
//! Pure set arithmetic over ids and counts the caller has already fetched.
//! The teacher dashboard's "sections without today's attendance" and
//! "assessments needing grading" widgets both live here so their rules are
//! testable without a database.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// Grading progress for one assessment.
#[derive(Debug, Clone)]
pub struct GradingProgress {
    pub assessment_id: DbId,
    /// Results recorded so far.
    pub graded_count: i64,
    /// Students enrolled in the assessment's section.
    pub enrolled_count: i64,
}

/// School-wide counts for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolCounts {
    pub students: i64,
    pub teachers: i64,
    pub sections: i64,
    /// Sections with at least one attendance row dated today.
    pub sections_marked_today: i64,
}

impl SchoolCounts {
    /// Share of sections with today's attendance marked, rounded percent.
    pub fn attendance_coverage_pct(&self) -> u8 {
        if self.sections <= 0 {
            return 0;
        }
        let pct =
            (self.sections_marked_today as f64 / self.sections as f64 * 100.0).round() as u8;
        pct.min(100)
    }
}

// ---------------------------------------------------------------------------
// Computation functions
// ---------------------------------------------------------------------------

/// Sections assigned to a teacher that have no attendance row dated today.
///
/// Order follows the assigned list.
pub fn sections_missing_attendance(assigned: &[DbId], marked_today: &[DbId]) -> Vec<DbId> {
    let marked: std::collections::HashSet<DbId> = marked_today.iter().copied().collect();
    assigned
        .iter()
        .copied()
        .filter(|id| !marked.contains(id))
        .collect()
}

/// Assessments whose graded-result count is below the enrolled count.
pub fn assessments_needing_grading(progress: &[GradingProgress]) -> Vec<DbId> {
    progress
        .iter()
        .filter(|p| p.graded_count < p.enrolled_count)
        .map(|p| p.assessment_id)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- sections_missing_attendance --------------------------------------

    #[test]
    fn all_sections_unmarked() {
        assert_eq!(sections_missing_attendance(&[1, 2, 3], &[]), vec![1, 2, 3]);
    }

    #[test]
    fn marked_sections_excluded() {
        assert_eq!(sections_missing_attendance(&[1, 2, 3], &[2]), vec![1, 3]);
    }

    #[test]
    fn all_marked_yields_empty() {
        assert!(sections_missing_attendance(&[1, 2], &[1, 2]).is_empty());
    }

    #[test]
    fn no_assigned_sections_yields_empty() {
        assert!(sections_missing_attendance(&[], &[1, 2]).is_empty());
    }

    #[test]
    fn marks_for_other_sections_ignored() {
        assert_eq!(sections_missing_attendance(&[1], &[9]), vec![1]);
    }

    // -- assessments_needing_grading --------------------------------------

    fn progress(id: DbId, graded: i64, enrolled: i64) -> GradingProgress {
        GradingProgress {
            assessment_id: id,
            graded_count: graded,
            enrolled_count: enrolled,
        }
    }

    #[test]
    fn partially_graded_needs_grading() {
        let rows = vec![progress(1, 10, 25), progress(2, 25, 25)];
        assert_eq!(assessments_needing_grading(&rows), vec![1]);
    }

    #[test]
    fn ungraded_needs_grading() {
        let rows = vec![progress(1, 0, 25)];
        assert_eq!(assessments_needing_grading(&rows), vec![1]);
    }

    #[test]
    fn fully_graded_does_not() {
        let rows = vec![progress(1, 25, 25)];
        assert!(assessments_needing_grading(&rows).is_empty());
    }

    #[test]
    fn empty_section_does_not_need_grading() {
        // No enrolled students: nothing to grade.
        let rows = vec![progress(1, 0, 0)];
        assert!(assessments_needing_grading(&rows).is_empty());
    }

    // -- SchoolCounts -----------------------------------------------------

    #[test]
    fn coverage_pct_zero_sections() {
        let counts = SchoolCounts::default();
        assert_eq!(counts.attendance_coverage_pct(), 0);
    }

    #[test]
    fn coverage_pct_rounds() {
        let counts = SchoolCounts {
            sections: 3,
            sections_marked_today: 2,
            ..Default::default()
        };
        assert_eq!(counts.attendance_coverage_pct(), 67);
    }

    #[test]
    fn coverage_pct_full() {
        let counts = SchoolCounts {
            sections: 4,
            sections_marked_today: 4,
            ..Default::default()
        };
        assert_eq!(counts.attendance_coverage_pct(), 100);
    }
}
