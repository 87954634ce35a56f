//! The cache service seam and the read-through helper.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::key::{ttl_for, CacheKey};

/// Keyed, tagged, time-bounded cache for derived views.
///
/// Implementations must treat expired entries as absent. Values are JSON
/// snapshots of the typed aggregate objects; the cache never partially
/// recomputes a stored value.
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Get a live entry. Expired or missing keys return `None`.
    async fn get(&self, key: &CacheKey) -> Option<serde_json::Value>;

    /// Store a value under `key` with the given TTL and invalidation tags.
    async fn set(
        &self,
        key: &CacheKey,
        value: serde_json::Value,
        ttl: Duration,
        tags: Vec<String>,
    );

    /// Drop every entry carrying any of `tags`. Returns the entry count
    /// removed.
    async fn invalidate_tags(&self, tags: &[String]) -> usize;

    /// Drop a single entry.
    async fn remove(&self, key: &CacheKey);
}

/// Read-through: return the cached value for `key`, or compute, store, and
/// return it.
///
/// On a hit the cached value is returned unchanged. On a miss the freshly
/// computed value is stored under the view's TTL with `tags` plus the
/// key's view-kind tag. A failed compute stores nothing, so an aborted
/// request leaves no partial cache entry. Concurrent misses for the same
/// key recompute redundantly; last write wins.
pub async fn read_through<T, E, F, Fut>(
    cache: &dyn CacheService,
    key: CacheKey,
    mut tags: Vec<String>,
    compute: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    if let Some(value) = cache.get(&key).await {
        match serde_json::from_value::<T>(value) {
            Ok(hit) => return Ok(hit),
            Err(err) => {
                // Shape drift after a deploy: treat as a miss.
                tracing::warn!(%key, error = %err, "Discarding undecodable cache entry");
                cache.remove(&key).await;
            }
        }
    }

    let computed = compute().await?;

    match serde_json::to_value(&computed) {
        Ok(value) => {
            tags.push(key.view_tag());
            cache.set(&key, value, ttl_for(key.view), tags).await;
        }
        Err(err) => {
            tracing::warn!(%key, error = %err, "Skipping cache for unserializable value");
        }
    }

    Ok(computed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ViewKind;
    use crate::memory::MemoryCache;
    use assert_matches::assert_matches;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct View {
        total: u32,
    }

    #[tokio::test]
    async fn miss_computes_and_populates() {
        let cache = MemoryCache::new();
        let key = CacheKey::new(ViewKind::Dashboard, 1);

        let result: Result<View, ()> = read_through(&cache, key, vec!["student-1".into()], || async {
            Ok(View { total: 5 })
        })
        .await;

        assert_eq!(result.unwrap(), View { total: 5 });
        assert!(cache.get(&key).await.is_some());
    }

    #[tokio::test]
    async fn hit_skips_compute() {
        let cache = MemoryCache::new();
        let key = CacheKey::new(ViewKind::Dashboard, 1);

        let _: Result<View, ()> =
            read_through(&cache, key, vec![], || async { Ok(View { total: 5 }) }).await;

        // Second read must not invoke compute.
        let result: Result<View, ()> = read_through(&cache, key, vec![], || async {
            panic!("compute must not run on a hit")
        })
        .await;

        assert_eq!(result.unwrap(), View { total: 5 });
    }

    #[tokio::test]
    async fn failed_compute_stores_nothing() {
        let cache = MemoryCache::new();
        let key = CacheKey::new(ViewKind::Gradebook, 2);

        let result: Result<View, &str> =
            read_through(&cache, key, vec![], || async { Err("store error") }).await;

        assert_matches!(result, Err("store error"));
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn entry_carries_view_tag() {
        let cache = MemoryCache::new();
        let key = CacheKey::new(ViewKind::Fees, 3);

        let _: Result<View, ()> =
            read_through(&cache, key, vec!["student-3".into()], || async {
                Ok(View { total: 1 })
            })
            .await;

        // Invalidating by the view-kind tag must drop the entry.
        let removed = cache.invalidate_tags(&["fees".to_string()]).await;
        assert_eq!(removed, 1);
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn undecodable_entry_treated_as_miss() {
        let cache = MemoryCache::new();
        let key = CacheKey::new(ViewKind::Dashboard, 4);
        cache
            .set(
                &key,
                serde_json::json!("not a view"),
                std::time::Duration::from_secs(60),
                vec![],
            )
            .await;

        let result: Result<View, ()> =
            read_through(&cache, key, vec![], || async { Ok(View { total: 9 }) }).await;

        assert_eq!(result.unwrap(), View { total: 9 });
    }
}
