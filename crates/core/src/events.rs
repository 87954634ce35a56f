//! Event approval status vocabulary, counts, and urgency classification.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Valid approval status strings (stored in `event_approvals.status`).
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_DECLINED: &str = "declined";

/// All valid approval status strings.
pub const VALID_APPROVAL_STATUSES: &[&str] =
    &[STATUS_PENDING, STATUS_APPROVED, STATUS_DECLINED];

/// A pending approval whose deadline is within this many hours is urgent.
pub const URGENCY_WINDOW_HOURS: i64 = 48;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Status of one (event, student, parent) approval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Declined,
}

impl ApprovalStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_APPROVED => Ok(Self::Approved),
            STATUS_DECLINED => Ok(Self::Declined),
            _ => Err(format!(
                "Invalid approval status '{s}'. Must be one of: {}",
                VALID_APPROVAL_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Approved => STATUS_APPROVED,
            Self::Declined => STATUS_DECLINED,
        }
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// Approval counts for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStatusCounts {
    pub pending: u32,
    pub approved: u32,
    pub declined: u32,
}

impl ApprovalStatusCounts {
    pub fn total(&self) -> u32 {
        self.pending + self.approved + self.declined
    }
}

// ---------------------------------------------------------------------------
// Computation functions
// ---------------------------------------------------------------------------

/// Count approvals per status.
pub fn approval_status_counts(statuses: &[ApprovalStatus]) -> ApprovalStatusCounts {
    let mut counts = ApprovalStatusCounts::default();
    for status in statuses {
        match status {
            ApprovalStatus::Pending => counts.pending += 1,
            ApprovalStatus::Approved => counts.approved += 1,
            ApprovalStatus::Declined => counts.declined += 1,
        }
    }
    counts
}

/// Whether a deadline is close enough to flag as urgent.
///
/// Urgent means the deadline has not passed and lies within
/// [`URGENCY_WINDOW_HOURS`] of `now`. Past deadlines are not urgent; they
/// are expired.
pub fn is_urgent(deadline: Timestamp, now: Timestamp) -> bool {
    let remaining = deadline - now;
    remaining >= chrono::Duration::zero()
        && remaining <= chrono::Duration::hours(URGENCY_WINDOW_HOURS)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn at(h: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap() + Duration::hours(h)
    }

    // -- ApprovalStatus ---------------------------------------------------

    #[test]
    fn status_round_trip() {
        for status in &[
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Declined,
        ] {
            assert_eq!(
                ApprovalStatus::from_str_value(status.as_str()).unwrap(),
                *status
            );
        }
    }

    #[test]
    fn status_invalid_rejected() {
        let result = ApprovalStatus::from_str_value("rejected");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid approval status"));
    }

    // -- approval_status_counts -------------------------------------------

    #[test]
    fn counts_empty() {
        let counts = approval_status_counts(&[]);
        assert_eq!(counts, ApprovalStatusCounts::default());
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn counts_partition_by_status() {
        let statuses = vec![
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Pending,
            ApprovalStatus::Declined,
            ApprovalStatus::Pending,
        ];

        let counts = approval_status_counts(&statuses);
        assert_eq!(counts.pending, 3);
        assert_eq!(counts.approved, 1);
        assert_eq!(counts.declined, 1);
        assert_eq!(counts.total(), 5);
    }

    // -- is_urgent --------------------------------------------------------

    #[test]
    fn deadline_within_window_is_urgent() {
        assert!(is_urgent(at(1), at(0)));
        assert!(is_urgent(at(47), at(0)));
        assert!(is_urgent(at(48), at(0)));
    }

    #[test]
    fn deadline_beyond_window_is_not_urgent() {
        assert!(!is_urgent(at(49), at(0)));
        assert!(!is_urgent(at(24 * 7), at(0)));
    }

    #[test]
    fn past_deadline_is_not_urgent() {
        assert!(!is_urgent(at(-1), at(0)));
    }

    #[test]
    fn deadline_exactly_now_is_urgent() {
        assert!(is_urgent(at(0), at(0)));
    }
}
