//! Tiered response cache
//!
//! Responses are cached by a canonicalized request signature with a TTL
//! drawn from the content-volatility tier of the endpoint. The cache is an
//! explicit object constructed once per client; storage is bounded, with
//! FIFO eviction of the oldest entry on overflow, and expired entries are
//! evicted lazily on lookup.

use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default maximum number of distinct cache keys
pub const DEFAULT_CAPACITY: usize = 256;

/// Time source, injectable so expiry is testable without sleeping
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time source used outside tests
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Cache TTL bucket, by expected data volatility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    /// Trending lists turn over fastest
    Trending,
    /// Popular and discovery listings
    Popular,
    /// Top-rated listings
    TopRated,
    /// Full title details
    Details,
    /// Genre catalogs
    Genres,
    /// Search results
    Search,
}

impl CacheTier {
    pub fn ttl(&self) -> Duration {
        match self {
            CacheTier::Trending => Duration::from_secs(60),
            CacheTier::Popular => Duration::from_secs(120),
            CacheTier::TopRated => Duration::from_secs(300),
            CacheTier::Details => Duration::from_secs(24 * 60 * 60),
            CacheTier::Genres => Duration::from_secs(24 * 60 * 60),
            CacheTier::Search => Duration::from_secs(600),
        }
    }
}

/// Canonical cache key: endpoint plus order-independent parameter encoding
pub fn canonical_key(endpoint: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();
    let mut key = String::from(endpoint);
    key.push('?');
    for (i, (name, value)) in sorted.iter().enumerate() {
        if i > 0 {
            key.push('&');
        }
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}

struct Entry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

/// Bounded FIFO response cache with per-entry TTL
pub struct ResponseCache {
    entries: HashMap<String, Entry>,
    order: VecDeque<String>,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
            clock,
        }
    }

    /// Look up a cached response; expired entries are evicted here
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        match self.entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) < entry.ttl => {
                Some(entry.value.clone())
            }
            Some(_) => {
                self.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a response under the given tier's TTL
    ///
    /// Re-storing an existing key refreshes its payload and timestamp but
    /// keeps its position in the eviction order.
    pub fn put(&mut self, key: String, value: Value, tier: CacheTier) {
        let entry = Entry {
            value,
            stored_at: self.clock.now(),
            ttl: tier.ttl(),
        };
        if self.entries.insert(key.clone(), entry).is_none() {
            self.order.push_back(key);
            while self.entries.len() > self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                } else {
                    break;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }
}
