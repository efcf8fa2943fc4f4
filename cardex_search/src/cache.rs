//! Recency-ordered lookup caches, one per entity type.

use cardex_core::{
    CacheConfig, ColorCandidate, LookupCache, PlayerCandidate, SeriesCandidate, TeamCandidate,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Bounded LRU cache: a hit moves the key to the most-recent position, an
/// insert at capacity evicts the least-recent key. No TTL.
pub struct LruLookupCache<V> {
    state: Mutex<LruState<V>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

struct LruState<V> {
    /// Value and the recency stamp of its last use.
    entries: HashMap<String, (u64, Arc<Vec<V>>)>,
    /// Stamp to key; the first entry is least recently used.
    order: BTreeMap<u64, String>,
    next_stamp: u64,
}

impl<V> LruState<V> {
    fn stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    /// Mark `key` as most recently used. No-op for absent keys.
    fn touch(&mut self, key: &str) {
        let stamp = self.stamp();
        if let Some((old, _)) = self.entries.get_mut(key) {
            let previous = std::mem::replace(old, stamp);
            self.order.remove(&previous);
            self.order.insert(stamp, key.to_string());
        }
    }

    fn insert(&mut self, key: String, value: Arc<Vec<V>>) {
        let stamp = self.stamp();
        if let Some((previous, _)) = self.entries.insert(key.clone(), (stamp, value)) {
            self.order.remove(&previous);
        }
        self.order.insert(stamp, key);
    }

    fn evict_to(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            let Some((_, oldest)) = self.order.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }
}

impl<V> LruLookupCache<V> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(LruState {
                entries: HashMap::new(),
                order: BTreeMap::new(),
                next_stamp: 0,
            }),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from least to most recently used.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.order.values().cloned().collect()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len_inner(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn len_inner(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

impl<V: Send + Sync> LookupCache<V> for LruLookupCache<V> {
    fn get(&self, key: &str) -> Option<Arc<Vec<V>>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.entries.get(key).map(|(_, value)| Arc::clone(value)) {
            Some(hit) => {
                state.touch(key);
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(hit)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn put(&self, key: String, candidates: Arc<Vec<V>>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.insert(key, candidates);
        state.evict_to(self.capacity);
    }

    fn len(&self) -> usize {
        self.len_inner()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// The process-wide cache set shared by every pipeline invocation.
#[derive(Clone)]
pub struct CatalogCaches {
    pub players: Arc<dyn LookupCache<PlayerCandidate>>,
    pub teams: Arc<dyn LookupCache<TeamCandidate>>,
    pub series: Arc<dyn LookupCache<SeriesCandidate>>,
    pub colors: Arc<dyn LookupCache<ColorCandidate>>,
    lru: Option<Arc<LruSet>>,
}

struct LruSet {
    players: Arc<LruLookupCache<PlayerCandidate>>,
    teams: Arc<LruLookupCache<TeamCandidate>>,
    series: Arc<LruLookupCache<SeriesCandidate>>,
    colors: Arc<LruLookupCache<ColorCandidate>>,
}

impl CatalogCaches {
    /// LRU caches sized per entity type.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        let set = Arc::new(LruSet {
            players: Arc::new(LruLookupCache::new(config.players)),
            teams: Arc::new(LruLookupCache::new(config.teams)),
            series: Arc::new(LruLookupCache::new(config.series)),
            colors: Arc::new(LruLookupCache::new(config.colors)),
        });
        Self {
            players: set.players.clone(),
            teams: set.teams.clone(),
            series: set.series.clone(),
            colors: set.colors.clone(),
            lru: Some(set),
        }
    }

    /// Caches backed by caller-supplied implementations.
    #[must_use]
    pub fn custom(
        players: Arc<dyn LookupCache<PlayerCandidate>>,
        teams: Arc<dyn LookupCache<TeamCandidate>>,
        series: Arc<dyn LookupCache<SeriesCandidate>>,
        colors: Arc<dyn LookupCache<ColorCandidate>>,
    ) -> Self {
        Self {
            players,
            teams,
            series,
            colors,
            lru: None,
        }
    }

    /// Hit/miss counters per entity type; empty for custom caches.
    #[must_use]
    pub fn stats(&self) -> Vec<(&'static str, CacheStats)> {
        self.lru.as_ref().map_or_else(Vec::new, |set| {
            vec![
                ("players", set.players.stats()),
                ("teams", set.teams.stats()),
                ("series", set.series.stats()),
                ("colors", set.colors.stats()),
            ]
        })
    }
}

impl Default for CatalogCaches {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: i64) -> Arc<Vec<i64>> {
        Arc::new(vec![n])
    }

    #[test]
    fn get_hit_refreshes_recency() {
        let cache = LruLookupCache::new(2);
        cache.put("a".to_string(), entry(1));
        cache.put("b".to_string(), entry(2));

        assert!(cache.get("a").is_some());
        cache.put("c".to_string(), entry(3));

        assert!(cache.get("b").is_none(), "b was least recently used");
        assert_eq!(cache.get("a").as_deref(), Some(&vec![1]));
        assert_eq!(cache.get("c").as_deref(), Some(&vec![3]));
    }

    #[test]
    fn put_at_capacity_evicts_oldest() {
        let cache = LruLookupCache::new(3);
        for (i, key) in ["a", "b", "c", "d"].into_iter().enumerate() {
            cache.put(key.to_string(), entry(i as i64));
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.keys(), vec!["b", "c", "d"]);
    }

    #[test]
    fn put_replaces_existing_entry() {
        let cache = LruLookupCache::new(2);
        cache.put("a".to_string(), entry(1));
        cache.put("a".to_string(), entry(9));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").as_deref(), Some(&vec![9]));
    }

    #[test]
    fn repeated_hits_keep_one_recency_slot() {
        let cache = LruLookupCache::new(3);
        for key in ["a", "b", "c"] {
            cache.put(key.to_string(), entry(1));
        }
        for _ in 0..5 {
            assert!(cache.get("a").is_some());
        }
        cache.put("b".to_string(), entry(2));
        assert_eq!(cache.keys(), vec!["c", "a", "b"]);

        cache.put("d".to_string(), entry(4));
        assert_eq!(cache.keys(), vec!["a", "b", "d"]);
    }

    #[test]
    fn stats_count_hits_and_misses() {
        let cache = LruLookupCache::new(4);
        cache.put("a".to_string(), entry(1));
        let _ = cache.get("a");
        let _ = cache.get("zzz");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn zero_capacity_still_holds_one_entry() {
        let cache = LruLookupCache::new(0);
        cache.put("a".to_string(), entry(1));
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn catalog_caches_report_per_type_stats() {
        let caches = CatalogCaches::default();
        let names: Vec<_> = caches.stats().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["players", "teams", "series", "colors"]);
    }
}
