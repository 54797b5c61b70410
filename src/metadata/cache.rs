use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use sha2::{Digest, Sha256};

use crate::models::UrlMetadata;

const KEY_PREFIX: &str = "qc_";

/// Deterministic cache key for an already-normalised URL.
pub fn cache_key(normalized_url: &str) -> String {
    let digest = Sha256::digest(normalized_url.as_bytes());
    format!("{KEY_PREFIX}{digest:x}")
}

// ── Clock ──────────────────────────────────────────────────────────────────

/// Time source for expiry checks. Swapped out in tests to step past a TTL.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ── Cache trait ────────────────────────────────────────────────────────────

/// Keyed metadata store with per-entry expiry.
///
/// `get` hands out clones; callers never hold a reference into the store.
pub trait MetadataCache: Send + Sync {
    /// Returns `None` when the key was never written or its entry expired.
    fn get(&self, key: &str) -> Option<UrlMetadata>;

    /// Stores `value` under `key`, replacing any previous entry.
    fn put(&self, key: &str, value: UrlMetadata, ttl: Duration);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    metadata: UrlMetadata,
    expires_at: DateTime<Utc>,
}

/// Volatile in-process cache with lazy expiry.
///
/// Cheaply cloneable; all clones share the same map.
#[derive(Clone)]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataCache for InMemoryCache {
    fn get(&self, key: &str) -> Option<UrlMetadata> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.expires_at > now => return Some(entry.metadata.clone()),
                Some(_) => {}
            }
        }

        // Expired: evict unless a concurrent writer refreshed it meanwhile.
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.get(key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(key);
        }
        None
    }

    fn put(&self, key: &str, value: UrlMetadata, ttl: Duration) {
        let now = self.clock.now();
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.entries.write().unwrap_or_else(|e| e.into_inner()).insert(
            key.to_string(),
            CacheEntry {
                metadata: value,
                expires_at,
            },
        );
    }
}

/// Periodically purge expired entries from `cache`.
///
/// Expiry is already enforced on read; this only bounds memory held by
/// entries that are never requested again.
pub fn spawn_sweeper(cache: InMemoryCache, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let purged = cache.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "Purged expired metadata cache entries");
            }
        }
    })
}

// ── Unit tests ─────────────────────────────────────────────────────────────
