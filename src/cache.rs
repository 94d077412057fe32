//! Query cache shared by list controllers and mutation workflows.
//!
//! Keyed by resource and scope. The cache is a disposable mirror of the
//! backend: invalidation marks entries stale so the last known value can
//! still be shown while a refetch runs. Stale entries older than the max
//! age are evicted.

use chrono::{DateTime, Duration, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::ResourceKind;
use crate::services::ResourceApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Page(u32),
    Id(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: ResourceKind,
    pub scope: Scope,
}

impl QueryKey {
    pub fn page(kind: ResourceKind, page: u32) -> Self {
        Self { kind, scope: Scope::Page(page) }
    }

    pub fn id(kind: ResourceKind, id: Uuid) -> Self {
        Self { kind, scope: Scope::Id(id) }
    }
}

/// How long a stale entry is kept around as placeholder data.
pub const DEFAULT_MAX_AGE_SECS: i64 = 300;

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    stale: bool,
    fetched_at: DateTime<Utc>,
}

#[derive(Default)]
struct Entries {
    map: HashMap<QueryKey, CacheEntry>,
    /// Bumped by every invalidation of a kind.
    epochs: HashMap<ResourceKind, u64>,
}

impl Entries {
    fn epoch(&self, kind: ResourceKind) -> u64 {
        self.epochs.get(&kind).copied().unwrap_or(0)
    }

    /// Drops entries that are both stale and older than `max_age`.
    fn prune(&mut self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let before = self.map.len();
        self.map.retain(|_, e| !(e.stale && e.fetched_at <= cutoff));
        before - self.map.len()
    }
}

/// A cached value handed back to readers.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub value: Arc<T>,
    pub stale: bool,
    pub fetched_at: DateTime<Utc>,
}

/// Invalidation epoch of a kind, read before a fetch is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch(u64);

pub struct QueryCache {
    entries: RwLock<Entries>,
    max_age: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_max_age(Duration::seconds(DEFAULT_MAX_AGE_SECS))
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            max_age,
        }
    }

    pub async fn get<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Cached<T>> {
        let entries = self.entries.read().await;
        let entry = entries.map.get(key)?;
        match Arc::clone(&entry.value).downcast::<T>() {
            Ok(value) => Some(Cached {
                value,
                stale: entry.stale,
                fetched_at: entry.fetched_at,
            }),
            Err(_) => {
                tracing::warn!("Cache entry type mismatch: key={:?}", key);
                None
            }
        }
    }

    pub async fn epoch(&self, kind: ResourceKind) -> Epoch {
        Epoch(self.entries.read().await.epoch(kind))
    }

    /// Stores a value fetched now, replacing any previous entry.
    pub async fn put<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) -> Arc<T> {
        let epoch = self.epoch(key.kind).await;
        self.put_fetched(key, value, epoch).await
    }

    /// Stores a value whose request was sent at `sent_at`. When the kind
    /// was invalidated while the request was in flight the entry is stored
    /// stale, so the next read refetches.
    pub async fn put_fetched<T: Send + Sync + 'static>(
        &self,
        key: QueryKey,
        value: T,
        sent_at: Epoch,
    ) -> Arc<T> {
        let value = Arc::new(value);
        let erased: Arc<dyn Any + Send + Sync> = value.clone();
        let mut entries = self.entries.write().await;
        let stale = entries.epoch(key.kind) != sent_at.0;
        if stale {
            tracing::debug!("Cache write outdated by invalidation: key={:?}", key);
        }
        entries.map.insert(
            key,
            CacheEntry {
                value: erased,
                stale,
                fetched_at: Utc::now(),
            },
        );
        entries.prune(self.max_age);
        value
    }

    pub async fn is_fresh(&self, key: &QueryKey) -> bool {
        let entries = self.entries.read().await;
        entries.map.get(key).is_some_and(|e| !e.stale)
    }

    /// Marks every entry of `kind` stale and evicts stale entries past
    /// their max age. Returns how many were marked.
    pub async fn invalidate(&self, kind: ResourceKind) -> usize {
        let mut entries = self.entries.write().await;
        *entries.epochs.entry(kind).or_insert(0) += 1;
        let mut marked = 0;
        for (key, entry) in entries.map.iter_mut() {
            if key.kind == kind && !entry.stale {
                entry.stale = true;
                marked += 1;
            }
        }
        let evicted = entries.prune(self.max_age);
        tracing::debug!(
            "Cache invalidated: kind={}, entries={}, evicted={}",
            kind,
            marked,
            evicted
        );
        marked
    }

    pub async fn remove(&self, key: &QueryKey) -> bool {
        self.entries.write().await.map.remove(key).is_some()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.map.is_empty()
    }

    /// Detail lookup cached under its own id, e.g. the room shown on an item
    /// card. Lookups for different ids are independent and may overlap.
    pub async fn fetch_by_id<A: ResourceApi>(&self, api: &A, id: Uuid) -> AppResult<Arc<A::Record>> {
        let key = QueryKey::id(api.kind(), id);
        if let Some(cached) = self.get::<A::Record>(&key).await {
            if !cached.stale {
                return Ok(cached.value);
            }
        }

        let sent_at = self.epoch(key.kind).await;
        let record = api.get(id).await?;
        Ok(self.put_fetched(key, record, sent_at).await)
    }
}
