//! Read-through / write-invalidate TTL cache (cache-aside).
//!
//! Sits in front of the durable store and trades staleness for latency under
//! an explicit time-to-live. Expiry is lazy: an entry is valid until
//! `stored_at + ttl_secs` and is dropped by the reader that finds it stale;
//! there is no background sweep.
//!
//! Deliberately **no single-flight de-duplication**: concurrent callers
//! racing on the same missing key may each run the loader and each overwrite
//! the cache; the last writer's value is what remains. The durable store is
//! the ground truth, so the race only costs redundant reads, never
//! correctness. Strengthening this into a lock would change the latency
//! profile and is left to callers that need it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use coursedesk_core::EntityId;

/// Default TTL for single-entity reads.
pub const DEFAULT_ENTITY_TTL_SECS: i64 = 3600;

/// Cache key convention: one entry per entity instance, `"<type>:<id>"`.
pub fn entity_key(entity_type: &str, id: EntityId) -> String {
    format!("{entity_type}:{id}")
}

/// Time source, injectable so TTL tests drive a simulated clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests.
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        if let Ok(mut now) = self.now.write() {
            *now += Duration::seconds(secs);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.read().map(|n| *n).unwrap_or_else(|_| Utc::now())
    }
}

struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
    ttl_secs: i64,
}

impl<V> CacheEntry<V> {
    fn fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.stored_at + Duration::seconds(self.ttl_secs)
    }
}

/// Generic TTL cache keyed by string.
///
/// The inner lock is held only across map operations, never across an await;
/// loaders run unlocked (which is what permits the documented race).
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Pure cache lookup: the value if present and unexpired, else a miss.
    /// Never touches the durable store.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        {
            let map = self.entries.read().ok()?;
            match map.get(key) {
                Some(entry) if entry.fresh_at(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Lazy expiry: drop the stale entry (re-checked under the write lock
        // in case a racing writer refreshed it meanwhile).
        if let Ok(mut map) = self.entries.write() {
            if map.get(key).is_some_and(|e| !e.fresh_at(now)) {
                map.remove(key);
            }
        }
        None
    }

    /// Unconditional overwrite; used after a successful mutation so the next
    /// read is warm without a round trip.
    pub fn set(&self, key: impl Into<String>, value: V, ttl_secs: i64) {
        let stored_at = self.clock.now();
        if let Ok(mut map) = self.entries.write() {
            map.insert(
                key.into(),
                CacheEntry {
                    value,
                    stored_at,
                    ttl_secs,
                },
            );
        }
    }

    /// Remove `key`; idempotent if already absent.
    pub fn invalidate(&self, key: &str) {
        if let Ok(mut map) = self.entries.write() {
            map.remove(key);
        }
    }

    /// Read-through: on hit return the cached value; on miss run `loader`
    /// (the durable read), store its result under `key`, and return it.
    ///
    /// If the loader fails the cache is left untouched and the error
    /// propagates unclassified — classification happens once, at the
    /// pipeline boundary.
    pub async fn get_or_load<E, F, Fut>(
        &self,
        key: &str,
        ttl_secs: i64,
        loader: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = loader().await?;
        self.set(key, value.clone(), ttl_secs);
        Ok(value)
    }
}
