use crate::traits::Clock;
use crate::types::{Article, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Vec<Article>,
    pub timestamp: DateTime<Utc>,
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

/// Per-scope article cache with a TTL.
///
/// Every key has its own async mutex. A caller holds it for the whole
/// check-compute-store sequence, so concurrent misses on one key run a
/// single computation and the rest wait for its result.
///
/// At most `max_entries` keys are kept. Adding a key first drops idle
/// expired slots, then the idle slot with the oldest entry. A slot is idle
/// when no caller holds a handle to it.
pub struct ScopeCache {
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    slots: RwLock<HashMap<String, Slot>>,
}

impl ScopeCache {
    pub fn new(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            clock,
            slots: RwLock::new(HashMap::new()),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        self.clock.now() - entry.timestamp < self.ttl
    }

    /// Number of keys currently held.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn slot(&self, key: &str) -> Slot {
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(key) {
                return slot.clone();
            }
        }

        let mut slots = self.slots.write().await;
        if let Some(slot) = slots.get(key) {
            return slot.clone();
        }
        self.evict_idle(&mut slots);

        let slot = Slot::default();
        slots.insert(key.to_string(), slot.clone());
        slot
    }

    // Handles are only cloned out under the map lock, so a strong count of
    // one under the write lock means nobody is using or waiting on the slot.
    fn evict_idle(&self, slots: &mut HashMap<String, Slot>) {
        let now = self.clock.now();
        slots.retain(|key, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            let keep = match slot.try_lock() {
                Ok(guard) => guard.as_ref().is_some_and(|e| now - e.timestamp < self.ttl),
                Err(_) => true,
            };
            if !keep {
                debug!("Evicting expired cache entry for scope {}", key);
            }
            keep
        });

        while slots.len() >= self.max_entries {
            let oldest = slots
                .iter()
                .filter(|(_, slot)| Arc::strong_count(slot) == 1)
                .filter_map(|(key, slot)| {
                    let guard = slot.try_lock().ok()?;
                    let timestamp = guard.as_ref().map(|e| e.timestamp);
                    Some((key.clone(), timestamp))
                })
                .min_by_key(|(_, timestamp)| *timestamp);

            match oldest {
                Some((key, _)) => {
                    debug!(
                        "Evicting cache entry for scope {} to stay within {} keys",
                        key, self.max_entries
                    );
                    slots.remove(&key);
                }
                None => break,
            }
        }
    }

    /// Return the fresh entry for `key`, or run `compute` and store its output.
    /// A failed computation leaves the previous entry untouched.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Result<Vec<Article>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Article>>>,
    {
        let slot = self.slot(key).await;
        let mut guard = slot.lock().await;

        if let Some(entry) = guard.as_ref() {
            if self.is_fresh(entry) {
                debug!("Cache hit for scope {}", key);
                return Ok(entry.data.clone());
            }
        }

        debug!("Cache miss for scope {}", key);
        let data = compute().await?;
        *guard = Some(CacheEntry {
            data: data.clone(),
            timestamp: self.clock.now(),
        });
        Ok(data)
    }

    /// Current entry for `key`, fresh or not. Waits for an in-flight computation.
    pub async fn entry(&self, key: &str) -> Option<CacheEntry> {
        let slot = {
            let slots = self.slots.read().await;
            slots.get(key)?.clone()
        };
        let guard = slot.lock().await;
        guard.clone()
    }
}
