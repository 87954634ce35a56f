//! In-process cache implementation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::key::CacheKey;
use crate::service::CacheService;

/// One stored entry: value snapshot, tag labels, expiry deadline.
struct CacheEntry {
    value: serde_json::Value,
    tags: Vec<String>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory tagged cache.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application. Expired entries are dropped lazily on
/// read and whenever a tag invalidation sweeps the map.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Create a new, empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live (non-expired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        let key_str = key.to_string();
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(&key_str) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it so the map does not accumulate dead entries.
        let mut entries = self.entries.write().await;
        if entries.get(&key_str).is_some_and(|e| e.is_expired(now)) {
            entries.remove(&key_str);
        }
        None
    }

    async fn set(
        &self,
        key: &CacheKey,
        value: serde_json::Value,
        ttl: Duration,
        tags: Vec<String>,
    ) {
        let entry = CacheEntry {
            value,
            tags,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
    }

    async fn invalidate_tags(&self, tags: &[String]) -> usize {
        if tags.is_empty() {
            return 0;
        }

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.iter().any(|t| tags.contains(t)));
        before - entries.len()
    }

    async fn remove(&self, key: &CacheKey) {
        self.entries.write().await.remove(&key.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ViewKind;
    use serde_json::json;

    fn key(view: ViewKind, id: i64) -> CacheKey {
        CacheKey::new(view, id)
    }

    fn student_tags(id: i64) -> Vec<String> {
        vec![format!("student-{id}"), "dashboard".to_string()]
    }

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let cache = MemoryCache::new();
        let k = key(ViewKind::Dashboard, 1);
        cache
            .set(&k, json!({"pct": 80}), Duration::from_secs(60), student_tags(1))
            .await;

        assert_eq!(cache.get(&k).await, Some(json!({"pct": 80})));
    }

    #[tokio::test]
    async fn missing_key_returns_none() {
        let cache = MemoryCache::new();
        assert!(cache.get(&key(ViewKind::Dashboard, 1)).await.is_none());
    }

    #[tokio::test]
    async fn distinct_entities_never_share_a_slot() {
        let cache = MemoryCache::new();
        let a = key(ViewKind::Dashboard, 1);
        let b = key(ViewKind::Dashboard, 2);
        cache
            .set(&a, json!(1), Duration::from_secs(60), student_tags(1))
            .await;
        cache
            .set(&b, json!(2), Duration::from_secs(60), student_tags(2))
            .await;

        assert_eq!(cache.get(&a).await, Some(json!(1)));
        assert_eq!(cache.get(&b).await, Some(json!(2)));
    }

    #[tokio::test]
    async fn distinct_views_never_share_a_slot() {
        let cache = MemoryCache::new();
        let dash = key(ViewKind::Dashboard, 1);
        let fees = key(ViewKind::Fees, 1);
        cache
            .set(&dash, json!("dash"), Duration::from_secs(60), vec![])
            .await;
        cache
            .set(&fees, json!("fees"), Duration::from_secs(60), vec![])
            .await;

        assert_eq!(cache.get(&dash).await, Some(json!("dash")));
        assert_eq!(cache.get(&fees).await, Some(json!("fees")));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_treated_as_absent() {
        let cache = MemoryCache::new();
        let k = key(ViewKind::Dashboard, 1);
        cache
            .set(&k, json!(1), Duration::from_secs(30), student_tags(1))
            .await;

        tokio::time::advance(Duration::from_secs(31)).await;

        assert!(cache.get(&k).await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_live_just_before_ttl() {
        let cache = MemoryCache::new();
        let k = key(ViewKind::Dashboard, 1);
        cache
            .set(&k, json!(1), Duration::from_secs(30), student_tags(1))
            .await;

        tokio::time::advance(Duration::from_secs(29)).await;

        assert!(cache.get(&k).await.is_some());
    }

    #[tokio::test]
    async fn invalidate_tag_removes_only_tagged_entries() {
        let cache = MemoryCache::new();
        let a = key(ViewKind::Dashboard, 1);
        let b = key(ViewKind::Dashboard, 2);
        cache
            .set(&a, json!(1), Duration::from_secs(60), student_tags(1))
            .await;
        cache
            .set(&b, json!(2), Duration::from_secs(60), student_tags(2))
            .await;

        let removed = cache.invalidate_tags(&["student-1".to_string()]).await;

        assert_eq!(removed, 1);
        assert!(cache.get(&a).await.is_none());
        assert_eq!(cache.get(&b).await, Some(json!(2)));
    }

    #[tokio::test]
    async fn invalidate_matches_any_of_the_given_tags() {
        let cache = MemoryCache::new();
        let a = key(ViewKind::Dashboard, 1);
        let b = key(ViewKind::Fees, 2);
        cache
            .set(&a, json!(1), Duration::from_secs(60), student_tags(1))
            .await;
        cache
            .set(
                &b,
                json!(2),
                Duration::from_secs(60),
                vec!["student-2".to_string(), "fees".to_string()],
            )
            .await;

        let removed = cache
            .invalidate_tags(&["student-1".to_string(), "student-2".to_string()])
            .await;

        assert_eq!(removed, 2);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn invalidate_empty_tag_list_is_a_no_op() {
        let cache = MemoryCache::new();
        let k = key(ViewKind::Dashboard, 1);
        cache
            .set(&k, json!(1), Duration::from_secs(60), student_tags(1))
            .await;

        assert_eq!(cache.invalidate_tags(&[]).await, 0);
        assert!(cache.get(&k).await.is_some());
    }

    #[tokio::test]
    async fn set_overwrites_existing_entry() {
        let cache = MemoryCache::new();
        let k = key(ViewKind::Dashboard, 1);
        cache
            .set(&k, json!("old"), Duration::from_secs(60), student_tags(1))
            .await;
        cache
            .set(&k, json!("new"), Duration::from_secs(60), student_tags(1))
            .await;

        assert_eq!(cache.get(&k).await, Some(json!("new")));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn remove_drops_entry() {
        let cache = MemoryCache::new();
        let k = key(ViewKind::Dashboard, 1);
        cache
            .set(&k, json!(1), Duration::from_secs(60), student_tags(1))
            .await;
        cache.remove(&k).await;

        assert!(cache.get(&k).await.is_none());
    }
}
