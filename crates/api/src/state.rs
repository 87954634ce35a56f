use std::sync::Arc;

use campus_cache::{tags_to_invalidate, CacheService, Mutation};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: campus_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Derived-view cache, injected behind the service trait so tests can
    /// swap implementations.
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    /// Apply the invalidation table for a mutation that just committed.
    ///
    /// Every mutating handler calls this after its store write succeeds;
    /// tags come from the central table, never from the call site.
    pub async fn invalidate_for(&self, mutation: &Mutation) {
        let tags = tags_to_invalidate(mutation);
        let removed = self.cache.invalidate_tags(&tags).await;
        tracing::debug!(?tags, removed, "Cache tags invalidated");
    }
}
