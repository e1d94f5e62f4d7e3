//! Cache Store Module
//!
//! Byte-budgeted LRU store combining HashMap storage with recency tracking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{ByteView, CacheEntry, CacheStats, LruTracker};

/// Callback invoked with every entry evicted to stay within budget.
pub type EvictionCallback = Arc<dyn Fn(&str, &ByteView) + Send + Sync>;

// == LRU Cache ==
/// Key -> [`ByteView`] store holding at most `max_bytes` of keys plus values.
///
/// Not synchronized; see [`SharedCache`] for the thread-safe wrapper.
pub struct LruCache {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Recency tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Byte budget
    max_bytes: usize,
    /// Bytes currently held
    used_bytes: usize,
    on_evicted: Option<EvictionCallback>,
}

impl LruCache {
    // == Constructor ==
    /// Creates an empty cache with the given byte budget.
    ///
    /// A budget of zero retains nothing.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(max_bytes),
            max_bytes,
            used_bytes: 0,
            on_evicted: None,
        }
    }

    /// Creates an empty cache that reports every eviction to `on_evicted`.
    pub fn with_eviction_callback(max_bytes: usize, on_evicted: EvictionCallback) -> Self {
        Self {
            on_evicted: Some(on_evicted),
            ..Self::new(max_bytes)
        }
    }

    // == Get ==
    /// Looks up a key and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<ByteView> {
        match self.entries.get(key) {
            Some(entry) => {
                let value = entry.value.clone();
                self.lru.touch(key);
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Add ==
    /// Inserts or replaces a value, then evicts least recently used entries
    /// until the budget holds again.
    ///
    /// A value larger than the whole budget is evicted right away.
    pub fn add(&mut self, key: &str, value: ByteView) {
        let entry = CacheEntry::new(key, value);
        self.used_bytes += entry.size;

        if let Some(previous) = self.entries.insert(key.to_string(), entry) {
            self.used_bytes -= previous.size;
        }
        self.lru.touch(key);

        while self.used_bytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }

        self.stats.set_occupancy(self.entries.len(), self.used_bytes);
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, returning its key.
    pub fn remove_oldest(&mut self) -> Option<String> {
        let key = self.lru.evict_oldest()?;
        if let Some(entry) = self.entries.remove(&key) {
            self.used_bytes -= entry.size;
            self.stats.record_eviction();
            self.stats.set_occupancy(self.entries.len(), self.used_bytes);
            if let Some(callback) = &self.on_evicted {
                callback(&key, &entry.value);
            }
        }
        Some(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_occupancy(self.entries.len(), self.used_bytes);
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes currently charged against the budget.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Checks residency without touching recency or statistics.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl fmt::Debug for LruCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("entries", &self.entries.len())
            .field("used_bytes", &self.used_bytes)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

// == Shared Cache ==
/// Thread-safe [`LruCache`] as owned by a group.
///
/// `get` and `add` each run under one exclusive lock, so concurrent callers
/// never see a half-applied insert or eviction.
#[derive(Debug)]
pub struct SharedCache {
    inner: Mutex<LruCache>,
}

impl SharedCache {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(max_bytes)),
        }
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        self.inner.lock().get(key)
    }

    pub fn add(&self, key: &str, value: ByteView) {
        self.inner.lock().add(key, value);
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_new() {
        let cache = LruCache::new(100);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.used_bytes(), 0);
        assert_eq!(cache.max_bytes(), 100);
    }

    #[test]
    fn test_cache_add_and_get() {
        let mut cache = LruCache::new(100);

        cache.add("key1", ByteView::from("1234"));
        let value = cache.get("key1").unwrap();

        assert_eq!(value.to_string(), "1234");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.used_bytes(), 8);
    }

    #[test]
    fn test_cache_get_missing() {
        let mut cache = LruCache::new(100);
        assert!(cache.get("missing").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_cache_overwrite_adjusts_bytes() {
        let mut cache = LruCache::new(100);

        cache.add("key", ByteView::from("1"));
        cache.add("key", ByteView::from("12345"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.used_bytes(), 8);
        assert_eq!(cache.get("key").unwrap().to_string(), "12345");
    }

    #[test]
    fn test_cache_evicts_oldest_when_over_budget() {
        let (k1, k2, k3) = ("key1", "key2", "k3");
        let (v1, v2, v3) = ("value1", "value2", "v3");
        let budget = k1.len() + k2.len() + v1.len() + v2.len();
        let mut cache = LruCache::new(budget);

        cache.add(k1, ByteView::from(v1));
        cache.add(k2, ByteView::from(v2));
        cache.add(k3, ByteView::from(v3));

        assert!(!cache.contains(k1));
        assert!(cache.contains(k2));
        assert!(cache.contains(k3));
        assert_eq!(cache.len(), 2);
        assert!(cache.used_bytes() <= budget);
    }

    #[test]
    fn test_cache_get_refreshes_recency() {
        let mut cache = LruCache::new(12);

        cache.add("a", ByteView::from("111"));
        cache.add("b", ByteView::from("222"));
        cache.add("c", ByteView::from("333"));
        assert!(cache.get("a").is_some());

        // "b" is now the oldest
        cache.add("d", ByteView::from("444"));

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));
    }

    #[test]
    fn test_cache_eviction_may_drop_several_entries() {
        let mut cache = LruCache::new(10);

        cache.add("a", ByteView::from("1"));
        cache.add("b", ByteView::from("2"));
        cache.add("c", ByteView::from("3"));
        cache.add("big", ByteView::from("12345"));

        assert!(cache.contains("big"));
        assert!(!cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn test_cache_zero_budget_keeps_nothing() {
        let mut cache = LruCache::new(0);

        cache.add("key", ByteView::from("value"));

        assert!(cache.is_empty());
        assert_eq!(cache.used_bytes(), 0);
        assert!(cache.get("key").is_none());
    }

    #[test]
    fn test_cache_value_larger_than_budget_is_not_retained() {
        let mut cache = LruCache::new(8);

        cache.add("small", ByteView::from("1"));
        cache.add("huge", ByteView::from("far too large"));

        assert!(cache.is_empty());
        assert_eq!(cache.used_bytes(), 0);
    }

    #[test]
    fn test_cache_eviction_callback() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let mut cache = LruCache::with_eviction_callback(
            10,
            Arc::new(move |key: &str, _value: &ByteView| sink.lock().push(key.to_string())),
        );

        cache.add("key1", ByteView::from("123456"));
        cache.add("k2", ByteView::from("k2"));
        cache.add("k3", ByteView::from("k3"));
        cache.add("k4", ByteView::from("k4"));

        assert_eq!(*evicted.lock(), vec!["key1".to_string(), "k2".to_string()]);
    }

    #[test]
    fn test_cache_stats() {
        let mut cache = LruCache::new(100);

        cache.add("key1", ByteView::from("v"));
        cache.get("key1");
        cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.used_bytes, 5);
        assert_eq!(stats.max_bytes, 100);
    }

    #[test]
    fn test_shared_cache_returns_independent_copies() {
        let cache = SharedCache::new(100);
        cache.add("key", ByteView::from("value"));

        let mut bytes = cache.get("key").unwrap().to_vec();
        bytes[0] = b'X';

        assert_eq!(cache.get("key").unwrap().to_string(), "value");
    }
}
