//! Tagged, time-bounded caching for derived dashboard views.
//!
//! Every cached entry is keyed by (view-kind, owning-entity-id), labeled
//! with invalidation tags, and bounded by a per-view TTL. Mutating
//! operations invalidate by tag through the single table in [`tags`];
//! the TTL is only a backstop beneath explicit invalidation.
//!
//! The cache is injected as an [`Arc<dyn CacheService>`](service::CacheService)
//! so handlers and tests share the same seam; [`memory::MemoryCache`] is
//! the in-process implementation.

pub mod key;
pub mod memory;
pub mod service;
pub mod tags;

pub use key::{ttl_for, CacheKey, ViewKind, TTL_LONG, TTL_MEDIUM, TTL_SHORT};
pub use memory::MemoryCache;
pub use service::{read_through, CacheService};
pub use tags::{tags_to_invalidate, Mutation};
