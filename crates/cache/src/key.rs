//! Cache keys and the TTL policy.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use campus_core::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// TTL for high-volatility views (today-sensitive state, unread counts).
pub const TTL_SHORT: Duration = Duration::from_secs(30);

/// TTL for general derived views.
pub const TTL_MEDIUM: Duration = Duration::from_secs(60);

/// TTL for low-volatility views.
pub const TTL_LONG: Duration = Duration::from_secs(300);

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The kind of derived view a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    Dashboard,
    AttendanceHistory,
    Gradebook,
    Fees,
    Conversations,
    Timetable,
}

impl ViewKind {
    /// Stable string form used in keys and view-kind tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::AttendanceHistory => "attendance-history",
            Self::Gradebook => "gradebook",
            Self::Fees => "fees",
            Self::Conversations => "conversations",
            Self::Timetable => "timetable",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TTL for a view kind. TTLs are a staleness backstop; explicit tag
/// invalidation on every mutation is the primary consistency mechanism.
pub fn ttl_for(view: ViewKind) -> Duration {
    match view {
        // Today's attendance state and unread badges go stale fastest.
        ViewKind::Dashboard | ViewKind::Conversations => TTL_SHORT,
        ViewKind::AttendanceHistory | ViewKind::Gradebook | ViewKind::Fees => TTL_MEDIUM,
        ViewKind::Timetable => TTL_LONG,
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// Composite cache key: view kind plus the owning entity's id.
///
/// The entity id is the profile id the view is about (student, teacher,
/// parent, or school). Ids are allocated from one global sequence, so two
/// entities never share a slot, and neither do two view kinds for the same
/// entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub view: ViewKind,
    pub entity_id: DbId,
}

impl CacheKey {
    pub fn new(view: ViewKind, entity_id: DbId) -> Self {
        Self { view, entity_id }
    }

    /// The view-kind tag every entry under this key carries.
    pub fn view_tag(&self) -> String {
        self.view.as_str().to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.view, self.entity_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_renders_view_and_entity() {
        let key = CacheKey::new(ViewKind::Dashboard, 42);
        assert_eq!(key.to_string(), "dashboard:42");
    }

    #[test]
    fn distinct_entities_render_distinct_keys() {
        let a = CacheKey::new(ViewKind::Dashboard, 1);
        let b = CacheKey::new(ViewKind::Dashboard, 2);
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn distinct_views_render_distinct_keys() {
        let a = CacheKey::new(ViewKind::Gradebook, 1);
        let b = CacheKey::new(ViewKind::Fees, 1);
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn view_kind_strings_are_kebab_case() {
        assert_eq!(ViewKind::AttendanceHistory.as_str(), "attendance-history");
        assert_eq!(ViewKind::Conversations.as_str(), "conversations");
    }

    #[test]
    fn ttl_tiers() {
        assert_eq!(ttl_for(ViewKind::Dashboard), TTL_SHORT);
        assert_eq!(ttl_for(ViewKind::Conversations), TTL_SHORT);
        assert_eq!(ttl_for(ViewKind::AttendanceHistory), TTL_MEDIUM);
        assert_eq!(ttl_for(ViewKind::Gradebook), TTL_MEDIUM);
        assert_eq!(ttl_for(ViewKind::Fees), TTL_MEDIUM);
        assert_eq!(ttl_for(ViewKind::Timetable), TTL_LONG);
    }

    #[test]
    fn view_tag_matches_rendering() {
        let key = CacheKey::new(ViewKind::Fees, 7);
        assert_eq!(key.view_tag(), "fees");
    }
}
