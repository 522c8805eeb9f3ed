//! Bounded LRU + TTL cache of built provider instances.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// One cached provider plus the record version it was built from.
struct CacheEntry<P> {
    provider: Arc<P>,
    version: i64,
    inserted_at: Instant,
    last_used: u64,
}

/// Interior cache of the provider authority.
///
/// Entries expire a fixed TTL after insertion (not after last use) and the
/// least-recently-used entry is evicted once the capacity bound is
/// exceeded. All operations take one short critical section; builds never
/// happen under the lock.
pub(crate) struct ProviderCache<P> {
    capacity: usize,
    ttl: Duration,
    tick: AtomicU64,
    entries: Mutex<HashMap<String, CacheEntry<P>>>,
}

impl<P> ProviderCache<P> {
    pub(crate) fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            tick: AtomicU64::new(0),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the live entry and its version, treating expired entries as
    /// absent (and dropping them).
    pub(crate) fn get(&self, provider_id: &str) -> Option<(Arc<P>, i64)> {
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(provider_id)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            entries.remove(provider_id);
            return None;
        }
        entry.last_used = self.tick.fetch_add(1, Ordering::Relaxed);
        Some((Arc::clone(&entry.provider), entry.version))
    }

    /// Inserts a built provider. An entry already holding a newer version
    /// wins over the insert; a racing build from a stale read must not
    /// clobber a fresher instance.
    pub(crate) fn insert(&self, provider_id: &str, provider: Arc<P>, version: i64) {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(provider_id) {
            if existing.version > version {
                return;
            }
        }
        entries.insert(
            provider_id.to_string(),
            CacheEntry {
                provider,
                version,
                inserted_at: Instant::now(),
                last_used: self.tick.fetch_add(1, Ordering::Relaxed),
            },
        );

        while entries.len() > self.capacity {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            entries.remove(&oldest);
        }
    }

    pub(crate) fn remove(&self, provider_id: &str) {
        self.entries.lock().remove(provider_id);
    }

    pub(crate) fn clear(&self) {
        self.entries.lock().clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
