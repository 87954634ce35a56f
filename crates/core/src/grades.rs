//! Grade percentage and aggregate computation.
//!
//! Percentages are always derived from `marks_obtained / total_marks` at
//! read time; they are never stored where they could drift from the
//! underlying marks. Aggregates distinguish "no data" (`None`) from a real
//! zero average.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Letter-grade cut-offs, checked in order.
pub const GRADE_A_PLUS_MIN: u8 = 90;
pub const GRADE_A_MIN: u8 = 80;
pub const GRADE_B_MIN: u8 = 70;

/// Margin in percentage points inside which a student tracks their cohort.
pub const TREND_MARGIN_PCT: u8 = 5;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Tri-state comparison of a student's average against a cohort average.
///
/// Exposed instead of a raw delta so small noise does not flip indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// One assessment result joined with its assessment, reduced for aggregation.
#[derive(Debug, Clone)]
pub struct ResultRow {
    pub subject_id: DbId,
    pub subject_name: String,
    pub marks_obtained: i32,
    pub total_marks: i32,
}

/// Per-subject aggregate over a student's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAggregate {
    pub subject_id: DbId,
    pub subject_name: String,
    pub count: u32,
    /// Rounded mean of the per-result percentages.
    pub average: u8,
    pub max: u8,
    pub min: u8,
}

/// Aggregate over all of a student's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallAggregate {
    pub count: u32,
    pub average: u8,
    pub max: u8,
    pub min: u8,
}

// ---------------------------------------------------------------------------
// Computation functions
// ---------------------------------------------------------------------------

/// Percentage for a single result: round(100 * obtained / total).
///
/// Returns 0 when `total_marks` is not positive, and clamps to 100.
pub fn percentage(marks_obtained: i32, total_marks: i32) -> u8 {
    if total_marks <= 0 || marks_obtained <= 0 {
        return 0;
    }
    let pct = (marks_obtained as f64 / total_marks as f64 * 100.0).round() as u8;
    pct.min(100)
}

/// Letter grade for a percentage.
pub fn letter(pct: u8) -> &'static str {
    if pct >= GRADE_A_PLUS_MIN {
        "A+"
    } else if pct >= GRADE_A_MIN {
        "A"
    } else if pct >= GRADE_B_MIN {
        "B"
    } else {
        "C"
    }
}

fn aggregate_pcts(pcts: &[u8]) -> (u8, u8, u8) {
    let sum: u32 = pcts.iter().map(|&p| p as u32).sum();
    let average = (sum as f64 / pcts.len() as f64).round() as u8;
    let max = *pcts.iter().max().unwrap_or(&0);
    let min = *pcts.iter().min().unwrap_or(&0);
    (average, max, min)
}

/// Group results by subject and compute count/average/max/min per subject.
///
/// Subjects are ordered by name ascending (id as tiebreaker) so the
/// breakdown is stable across recomputations.
pub fn subject_breakdown(results: &[ResultRow]) -> Vec<SubjectAggregate> {
    let mut by_subject: std::collections::BTreeMap<(String, DbId), Vec<u8>> =
        std::collections::BTreeMap::new();

    for row in results {
        by_subject
            .entry((row.subject_name.clone(), row.subject_id))
            .or_default()
            .push(percentage(row.marks_obtained, row.total_marks));
    }

    by_subject
        .into_iter()
        .map(|((subject_name, subject_id), pcts)| {
            let (average, max, min) = aggregate_pcts(&pcts);
            SubjectAggregate {
                subject_id,
                subject_name,
                count: pcts.len() as u32,
                average,
                max,
                min,
            }
        })
        .collect()
}

/// Aggregate across all results. `None` is the explicit no-data state.
pub fn overall(results: &[ResultRow]) -> Option<OverallAggregate> {
    if results.is_empty() {
        return None;
    }

    let pcts: Vec<u8> = results
        .iter()
        .map(|r| percentage(r.marks_obtained, r.total_marks))
        .collect();
    let (average, max, min) = aggregate_pcts(&pcts);

    Some(OverallAggregate {
        count: pcts.len() as u32,
        average,
        max,
        min,
    })
}

/// Classify a student's average against a cohort average.
///
/// Differences within [`TREND_MARGIN_PCT`] points read as [`Trend::Flat`].
pub fn classify_trend(student_avg: u8, cohort_avg: u8) -> Trend {
    let delta = student_avg as i16 - cohort_avg as i16;
    if delta > TREND_MARGIN_PCT as i16 {
        Trend::Up
    } else if delta < -(TREND_MARGIN_PCT as i16) {
        Trend::Down
    } else {
        Trend::Flat
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn row(subject_id: DbId, subject_name: &str, obtained: i32, total: i32) -> ResultRow {
        ResultRow {
            subject_id,
            subject_name: subject_name.to_string(),
            marks_obtained: obtained,
            total_marks: total,
        }
    }

    // -- percentage -------------------------------------------------------

    #[test]
    fn percentage_basic() {
        assert_eq!(percentage(72, 100), 72);
    }

    #[test]
    fn percentage_rounds() {
        // 33/40 = 82.5 -> 83 (round half away from zero)
        assert_eq!(percentage(33, 40), 83);
        // 1/3 = 33.33 -> 33
        assert_eq!(percentage(1, 3), 33);
    }

    #[test]
    fn percentage_zero_total_is_zero() {
        assert_eq!(percentage(50, 0), 0);
    }

    #[test]
    fn percentage_negative_total_is_zero() {
        assert_eq!(percentage(50, -10), 0);
    }

    #[test]
    fn percentage_clamped_to_100() {
        assert_eq!(percentage(120, 100), 100);
    }

    #[test]
    fn percentage_full_marks() {
        assert_eq!(percentage(40, 40), 100);
    }

    // -- letter -----------------------------------------------------------

    #[test]
    fn letter_buckets() {
        assert_eq!(letter(95), "A+");
        assert_eq!(letter(90), "A+");
        assert_eq!(letter(89), "A");
        assert_eq!(letter(80), "A");
        assert_eq!(letter(79), "B");
        assert_eq!(letter(70), "B");
        assert_eq!(letter(69), "C");
        assert_eq!(letter(0), "C");
    }

    #[test]
    fn seventy_two_is_b() {
        let pct = percentage(72, 100);
        assert_eq!(pct, 72);
        assert_eq!(letter(pct), "B");
    }

    // -- subject_breakdown ------------------------------------------------

    #[test]
    fn empty_results_yield_empty_breakdown() {
        assert!(subject_breakdown(&[]).is_empty());
    }

    #[test]
    fn breakdown_groups_by_subject() {
        let results = vec![
            row(1, "Maths", 80, 100),
            row(1, "Maths", 60, 100),
            row(2, "English", 90, 100),
        ];

        let breakdown = subject_breakdown(&results);
        assert_eq!(breakdown.len(), 2);

        // Sorted by subject name: English before Maths.
        assert_eq!(breakdown[0].subject_name, "English");
        assert_eq!(breakdown[0].count, 1);
        assert_eq!(breakdown[0].average, 90);

        assert_eq!(breakdown[1].subject_name, "Maths");
        assert_eq!(breakdown[1].count, 2);
        assert_eq!(breakdown[1].average, 70);
        assert_eq!(breakdown[1].max, 80);
        assert_eq!(breakdown[1].min, 60);
    }

    #[test]
    fn breakdown_uses_assessment_total_marks() {
        // 18/20 = 90%, 45/50 = 90% -- different scales, same percentage.
        let results = vec![row(1, "Science", 18, 20), row(1, "Science", 45, 50)];

        let breakdown = subject_breakdown(&results);
        assert_eq!(breakdown[0].average, 90);
        assert_eq!(breakdown[0].max, 90);
        assert_eq!(breakdown[0].min, 90);
    }

    // -- overall ----------------------------------------------------------

    #[test]
    fn overall_empty_is_none() {
        assert!(overall(&[]).is_none());
    }

    #[test]
    fn overall_aggregates_across_subjects() {
        let results = vec![
            row(1, "Maths", 80, 100),
            row(2, "English", 90, 100),
            row(3, "Science", 70, 100),
        ];

        let agg = overall(&results).unwrap();
        assert_eq!(agg.count, 3);
        assert_eq!(agg.average, 80);
        assert_eq!(agg.max, 90);
        assert_eq!(agg.min, 70);
    }

    #[test]
    fn overall_average_rounds() {
        let results = vec![row(1, "Maths", 70, 100), row(1, "Maths", 75, 100)];
        // (70 + 75) / 2 = 72.5 -> 73
        assert_eq!(overall(&results).unwrap().average, 73);
    }

    // -- classify_trend ---------------------------------------------------

    #[test]
    fn trend_within_margin_is_flat() {
        assert_eq!(classify_trend(75, 75), Trend::Flat);
        assert_eq!(classify_trend(80, 75), Trend::Flat);
        assert_eq!(classify_trend(70, 75), Trend::Flat);
    }

    #[test]
    fn trend_above_margin_is_up() {
        assert_eq!(classify_trend(81, 75), Trend::Up);
        assert_eq!(classify_trend(100, 0), Trend::Up);
    }

    #[test]
    fn trend_below_margin_is_down() {
        assert_eq!(classify_trend(69, 75), Trend::Down);
        assert_eq!(classify_trend(0, 100), Trend::Down);
    }

    #[test]
    fn trend_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Trend::Up).unwrap(), "\"up\"");
        assert_eq!(serde_json::to_string(&Trend::Flat).unwrap(), "\"flat\"");
    }
}
