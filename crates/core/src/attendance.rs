//! Attendance statistics computation.
//!
//! Provides the status vocabulary, per-window statistics, and the monthly
//! breakdown used by student, parent, and admin dashboards. The `core`
//! crate contains no database dependencies; all records are passed in by
//! the caller, already scoped to one student (or one section).

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::types::Date;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Valid attendance status strings (stored in `attendance_records.status`).
pub const STATUS_PRESENT: &str = "present";
pub const STATUS_ABSENT: &str = "absent";
pub const STATUS_LATE: &str = "late";
pub const STATUS_EXCUSED: &str = "excused";

/// All valid attendance status strings.
pub const VALID_ATTENDANCE_STATUSES: &[&str] =
    &[STATUS_PRESENT, STATUS_ABSENT, STATUS_LATE, STATUS_EXCUSED];

/// Number of months returned by the monthly breakdown, most recent first.
pub const MONTHLY_BREAKDOWN_MONTHS: usize = 6;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Status of a single attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_PRESENT => Ok(Self::Present),
            STATUS_ABSENT => Ok(Self::Absent),
            STATUS_LATE => Ok(Self::Late),
            STATUS_EXCUSED => Ok(Self::Excused),
            _ => Err(format!(
                "Invalid attendance status '{s}'. Must be one of: {}",
                VALID_ATTENDANCE_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => STATUS_PRESENT,
            Self::Absent => STATUS_ABSENT,
            Self::Late => STATUS_LATE,
            Self::Excused => STATUS_EXCUSED,
        }
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// One attendance record, reduced to the fields aggregation needs.
#[derive(Debug, Clone)]
pub struct DayRecord {
    pub date: Date,
    pub status: AttendanceStatus,
}

/// Aggregated attendance statistics for one student over one window.
///
/// Two policies coexist and must not be conflated: `present_days` counts
/// only PRESENT (the "presence" display stat), while `percentage` treats
/// PRESENT and LATE as attended (the "participation" rate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub present_days: u32,
    pub late_days: u32,
    pub absent_days: u32,
    pub excused_days: u32,
    pub total_days: u32,
    /// round(100 * (present + late) / total); 0 when there are no records.
    pub percentage: u8,
}

impl AttendanceStats {
    /// The zero-valued stats returned for an empty window.
    pub fn empty() -> Self {
        Self {
            present_days: 0,
            late_days: 0,
            absent_days: 0,
            excused_days: 0,
            total_days: 0,
            percentage: 0,
        }
    }
}

/// Attendance statistics for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAttendance {
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    #[serde(flatten)]
    pub stats: AttendanceStats,
}

// ---------------------------------------------------------------------------
// Aggregation functions
// ---------------------------------------------------------------------------

/// Compute the participation percentage from attended and total day counts.
///
/// Returns 0 if `total` is 0.
pub fn participation_pct(attended: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (attended as f64 / total as f64 * 100.0).round() as u8;
    pct.min(100)
}

/// Compute attendance statistics over a set of records.
///
/// Empty input yields [`AttendanceStats::empty`], never an error.
pub fn compute_stats(records: &[DayRecord]) -> AttendanceStats {
    let mut stats = AttendanceStats::empty();

    for record in records {
        stats.total_days += 1;
        match record.status {
            AttendanceStatus::Present => stats.present_days += 1,
            AttendanceStatus::Late => stats.late_days += 1,
            AttendanceStatus::Absent => stats.absent_days += 1,
            AttendanceStatus::Excused => stats.excused_days += 1,
        }
    }

    stats.percentage =
        participation_pct(stats.present_days + stats.late_days, stats.total_days);
    stats
}

/// Bucket records by (year, calendar month) and compute per-bucket stats.
///
/// Buckets are sorted descending by (year, month) and truncated to the
/// most recent [`MONTHLY_BREAKDOWN_MONTHS`].
pub fn monthly_breakdown(records: &[DayRecord]) -> Vec<MonthlyAttendance> {
    let mut buckets: std::collections::BTreeMap<(i32, u32), Vec<DayRecord>> =
        std::collections::BTreeMap::new();

    for record in records {
        buckets
            .entry((record.date.year(), record.date.month()))
            .or_default()
            .push(record.clone());
    }

    buckets
        .into_iter()
        .rev()
        .take(MONTHLY_BREAKDOWN_MONTHS)
        .map(|((year, month), month_records)| MonthlyAttendance {
            year,
            month,
            stats: compute_stats(&month_records),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32, status: AttendanceStatus) -> DayRecord {
        DayRecord {
            date: Date::from_ymd_opt(y, m, d).unwrap(),
            status,
        }
    }

    // -- AttendanceStatus -------------------------------------------------

    #[test]
    fn status_from_str_round_trip() {
        for status in &[
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::Late,
            AttendanceStatus::Excused,
        ] {
            assert_eq!(
                AttendanceStatus::from_str_value(status.as_str()).unwrap(),
                *status
            );
        }
    }

    #[test]
    fn status_from_str_invalid() {
        let result = AttendanceStatus::from_str_value("tardy");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid attendance status"));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&AttendanceStatus::Excused).unwrap();
        assert_eq!(json, "\"excused\"");
    }

    // -- participation_pct ------------------------------------------------

    #[test]
    fn pct_zero_total_returns_zero() {
        assert_eq!(participation_pct(0, 0), 0);
    }

    #[test]
    fn pct_all_attended_returns_100() {
        assert_eq!(participation_pct(20, 20), 100);
    }

    #[test]
    fn pct_rounds_to_nearest() {
        // 2/3 = 66.67 -> 67
        assert_eq!(participation_pct(2, 3), 67);
        // 1/3 = 33.33 -> 33
        assert_eq!(participation_pct(1, 3), 33);
    }

    // -- compute_stats ----------------------------------------------------

    #[test]
    fn empty_records_yield_zero_stats() {
        let stats = compute_stats(&[]);
        assert_eq!(stats, AttendanceStats::empty());
        assert_eq!(stats.percentage, 0);
    }

    #[test]
    fn mixed_statuses_counted_distinctly() {
        // PRESENT, PRESENT, LATE, ABSENT, PRESENT
        let records = vec![
            day(2026, 3, 2, AttendanceStatus::Present),
            day(2026, 3, 3, AttendanceStatus::Present),
            day(2026, 3, 4, AttendanceStatus::Late),
            day(2026, 3, 5, AttendanceStatus::Absent),
            day(2026, 3, 6, AttendanceStatus::Present),
        ];

        let stats = compute_stats(&records);
        assert_eq!(stats.present_days, 3);
        assert_eq!(stats.late_days, 1);
        assert_eq!(stats.absent_days, 1);
        assert_eq!(stats.excused_days, 0);
        assert_eq!(stats.total_days, 5);
        // Participation counts PRESENT and LATE: round(100 * 4 / 5) = 80.
        assert_eq!(stats.percentage, 80);
    }

    #[test]
    fn late_not_counted_as_present_day() {
        let records = vec![
            day(2026, 3, 2, AttendanceStatus::Late),
            day(2026, 3, 3, AttendanceStatus::Late),
        ];

        let stats = compute_stats(&records);
        assert_eq!(stats.present_days, 0);
        assert_eq!(stats.late_days, 2);
        // But late days count toward participation.
        assert_eq!(stats.percentage, 100);
    }

    #[test]
    fn excused_does_not_count_toward_participation() {
        let records = vec![
            day(2026, 3, 2, AttendanceStatus::Present),
            day(2026, 3, 3, AttendanceStatus::Excused),
        ];

        let stats = compute_stats(&records);
        assert_eq!(stats.excused_days, 1);
        assert_eq!(stats.percentage, 50);
    }

    #[test]
    fn all_absent_is_zero_percent() {
        let records = vec![
            day(2026, 3, 2, AttendanceStatus::Absent),
            day(2026, 3, 3, AttendanceStatus::Absent),
        ];
        assert_eq!(compute_stats(&records).percentage, 0);
    }

    // -- monthly_breakdown ------------------------------------------------

    #[test]
    fn empty_records_yield_no_buckets() {
        assert!(monthly_breakdown(&[]).is_empty());
    }

    #[test]
    fn buckets_grouped_by_calendar_month() {
        let records = vec![
            day(2026, 2, 10, AttendanceStatus::Present),
            day(2026, 2, 11, AttendanceStatus::Absent),
            day(2026, 3, 2, AttendanceStatus::Present),
        ];

        let months = monthly_breakdown(&records);
        assert_eq!(months.len(), 2);
        // Most recent month first.
        assert_eq!((months[0].year, months[0].month), (2026, 3));
        assert_eq!(months[0].stats.total_days, 1);
        assert_eq!((months[1].year, months[1].month), (2026, 2));
        assert_eq!(months[1].stats.total_days, 2);
        assert_eq!(months[1].stats.percentage, 50);
    }

    #[test]
    fn buckets_sorted_descending_across_years() {
        let records = vec![
            day(2025, 12, 1, AttendanceStatus::Present),
            day(2026, 1, 5, AttendanceStatus::Present),
            day(2025, 11, 3, AttendanceStatus::Present),
        ];

        let months = monthly_breakdown(&records);
        let keys: Vec<(i32, u32)> = months.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(keys, vec![(2026, 1), (2025, 12), (2025, 11)]);
    }

    #[test]
    fn breakdown_truncates_to_six_months() {
        let mut records = Vec::new();
        for month in 1..=9 {
            records.push(day(2026, month, 1, AttendanceStatus::Present));
        }

        let months = monthly_breakdown(&records);
        assert_eq!(months.len(), MONTHLY_BREAKDOWN_MONTHS);
        // The oldest three months (Jan-Mar) fall off.
        assert_eq!((months[0].year, months[0].month), (2026, 9));
        assert_eq!((months[5].year, months[5].month), (2026, 4));
    }

    #[test]
    fn monthly_percentage_uses_participation_rule() {
        let records = vec![
            day(2026, 5, 4, AttendanceStatus::Present),
            day(2026, 5, 5, AttendanceStatus::Late),
            day(2026, 5, 6, AttendanceStatus::Absent),
        ];

        let months = monthly_breakdown(&records);
        assert_eq!(months.len(), 1);
        // round(100 * 2 / 3) = 67
        assert_eq!(months[0].stats.percentage, 67);
    }
}
