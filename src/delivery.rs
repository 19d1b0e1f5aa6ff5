//! Recently handled webhook deliveries
//!
//! GitHub redelivers webhooks on timeouts and on manual request. A delivery
//! id is reserved when handling starts and released again if handling fails,
//! so a redelivery (even one racing the original) does not label the same
//! pull request twice while a failed one can still be retried.
//! - Key: `x-github-delivery` header value
//! - TTL: 1 hour by default
//! - Capacity: 1000 deliveries by default

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(n) => n,
    None => panic!("capacity must be non-zero"),
};

const DEFAULT_TTL_SECONDS: i64 = 3600;

/// LRU cache of delivery ids with TTL
pub struct DeliveryCache {
    /// Delivery id -> time it was reserved
    cache: Mutex<LruCache<String, DateTime<Utc>>>,
    /// Time-to-live for cache entries
    ttl: Duration,
}

impl DeliveryCache {
    /// Create a new delivery cache
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of delivery ids to remember
    /// * `ttl_seconds` - Time-to-live in seconds for each entry; values that
    ///   are not positive or out of range fall back to one hour
    pub fn new(capacity: usize, ttl_seconds: i64) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        let ttl = Some(ttl_seconds)
            .filter(|s| *s > 0)
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| {
                tracing::warn!(ttl_seconds, "Invalid delivery cache TTL, using default");
                Duration::seconds(DEFAULT_TTL_SECONDS)
            });

        Self {
            cache: Mutex::new(LruCache::new(cap)),
            ttl,
        }
    }

    /// Claim `delivery_id` for handling
    ///
    /// Returns false when the id was already claimed within the TTL.
    /// Check and insert happen under one lock, so only one of several
    /// concurrent requests with the same id gets `true`.
    pub fn reserve(&self, delivery_id: &str) -> bool {
        self.reserve_at(delivery_id, Utc::now())
    }

    fn reserve_at(&self, delivery_id: &str, now: DateTime<Utc>) -> bool {
        let mut cache = self.cache.lock();

        let fresh = cache
            .get(delivery_id)
            .is_some_and(|reserved_at| now - *reserved_at < self.ttl);
        if fresh {
            tracing::trace!(delivery = delivery_id, "Delivery cache hit");
            return false;
        }

        cache.put(delivery_id.to_string(), now);
        true
    }

    /// Forget `delivery_id` so a redelivery is handled again
    pub fn release(&self, delivery_id: &str) {
        self.cache.lock().pop(delivery_id);
    }

    /// Number of remembered deliveries (including expired, not yet evicted)
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DeliveryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY.get(), DEFAULT_TTL_SECONDS)
    }
}
