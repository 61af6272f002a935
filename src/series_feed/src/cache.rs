//! Time-to-live cache for fetched (or synthesized) resource payloads.
//!
//! Readers call [`CacheStore::get`] / [`CacheStore::get_valid`], which load an
//! `Arc<HashMap<..>>` snapshot with no lock contention. Writers replace the whole
//! map through `arc-swap`'s read-copy-update, so a reader sees either the old or
//! the new snapshot and never a half-written one.
//!
//! Implementation notes:
//! - Entries are immutable. A new fetch for the same key inserts a replacement.
//! - Staleness is checked on lookup: `now - created_at < ttl`.
//! - The map is bounded by `capacity`. An insert that would exceed it first
//!   sweeps expired entries, then drops the oldest ones.
//! - Timestamps come from `tokio::time::Instant` so tests can pause the clock.
//! - Payloads are type-erased (`Arc<dyn Any>`). The resource kind in the key
//!   determines the concrete type; see [`CacheEntry::payload`].

use std::{any::Any, collections::HashMap, fmt, sync::Arc, time::Duration};

use arc_swap::ArcSwap;
use tokio::time::Instant;
use tracing::debug;

use crate::{
    config::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL},
    models::{EntityId, Period, SourceTag},
    resources::ResourceKind,
};

/// Composite of resource kind, entity and period.
///
/// Correlations also record the metric they were computed against, so a city
/// and a coin sharing an identifier never share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: ResourceKind,
    pub against: Option<ResourceKind>,
    pub entity: EntityId,
    pub period: Period,
}

impl CacheKey {
    pub fn new(kind: ResourceKind, entity: EntityId, period: Period) -> Self {
        Self {
            kind,
            against: None,
            entity,
            period,
        }
    }

    pub fn against(mut self, metric: ResourceKind) -> Self {
        self.against = Some(metric);
        self
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.against {
            Some(metric) => write!(f, "{}:{}:{}:{}", self.kind, metric, self.entity, self.period),
            None => write!(f, "{}:{}:{}", self.kind, self.entity, self.period),
        }
    }
}

pub type Payload = Arc<dyn Any + Send + Sync>;

pub struct CacheEntry {
    pub key: CacheKey,
    payload: Payload,
    pub created_at: Instant,
    pub source: SourceTag,
}

impl CacheEntry {
    /// Returns the payload if it is a `T`.
    pub fn payload<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.payload).downcast::<T>().ok()
    }

    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.created_at)
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("created_at", &self.created_at)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

type Snapshot = HashMap<CacheKey, Arc<CacheEntry>>;

pub struct CacheStore {
    entries: ArcSwap<Snapshot>,
    ttl: Duration,
    capacity: usize,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL, DEFAULT_CACHE_CAPACITY)
    }
}

impl CacheStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: ArcSwap::from_pointee(Snapshot::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the entry under `key`, stale or not.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.entries.load().get(key).cloned()
    }

    /// Returns the entry under `key` only while it is within its TTL.
    pub fn get_valid(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.get(key).filter(|entry| self.is_valid(entry))
    }

    pub fn is_valid(&self, entry: &CacheEntry) -> bool {
        entry.age() < self.ttl
    }

    /// Stores `payload` under `key`, replacing any previous entry.
    pub fn set<T: Any + Send + Sync>(
        &self,
        key: CacheKey,
        payload: Arc<T>,
        source: SourceTag,
    ) -> Arc<CacheEntry> {
        let entry = Arc::new(CacheEntry {
            key: key.clone(),
            payload,
            created_at: Instant::now(),
            source,
        });
        let ttl = self.ttl;
        let capacity = self.capacity;
        self.entries.rcu(|current| {
            let mut next: Snapshot = (**current).clone();
            next.insert(key.clone(), Arc::clone(&entry));
            if next.len() > capacity {
                evict(&mut next, &key, ttl, capacity);
            }
            next
        });
        debug!(key = %key, source = %source, "cached payload");
        entry
    }

    /// Drops every entry past its TTL and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut removed = 0;
        self.entries.rcu(|current| {
            let mut next: Snapshot = (**current).clone();
            next.retain(|_, entry| entry.age() < ttl);
            removed = current.len() - next.len();
            next
        });
        if removed > 0 {
            debug!(removed, "purged expired cache entries");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bring `map` back within `capacity`: expired entries go first, then the oldest.
/// `keep` (the entry just written) is never evicted, even when timestamps tie.
fn evict(map: &mut Snapshot, keep: &CacheKey, ttl: Duration, capacity: usize) {
    map.retain(|key, entry| key == keep || entry.age() < ttl);
    if map.len() <= capacity {
        return;
    }
    let mut by_age: Vec<(Instant, CacheKey)> = map
        .values()
        .filter(|entry| &entry.key != keep)
        .map(|entry| (entry.created_at, entry.key.clone()))
        .collect();
    by_age.sort_by_key(|(created_at, _)| *created_at);
    let excess = map.len() - capacity;
    for (_, key) in by_age.into_iter().take(excess) {
        map.remove(&key);
    }
}
