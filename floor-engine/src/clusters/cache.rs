//! Cluster cache
//!
//! Same read / write / propagate rules as the layout cache, with two
//! differences: the base configuration is "no clusters" and a miss with no
//! prior entry returns empty without inserting anything; and the cache is
//! bounded. Every read or write touches the entry's `last_accessed` tick, and
//! after every write entries are evicted least recently accessed first until
//! the cache is back under capacity.

use std::collections::HashMap;

use shared::models::{CachedCluster, LayoutKey};

use crate::timeline::{Entry, Provenance, Timeline};

pub const DEFAULT_CLUSTER_CAPACITY: usize = 100;

/// Cluster cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterStats {
    pub hits: u64,
    /// Misses with no prior entry, answered with an empty list
    pub misses: u64,
    pub prior_fallbacks: u64,
    pub saves: u64,
    pub propagated: u64,
    pub evictions: u64,
}

#[derive(Debug)]
pub struct ClusterCache {
    timeline: Timeline<Vec<CachedCluster>>,
    last_accessed: HashMap<LayoutKey, u64>,
    tick: u64,
    capacity: usize,
    stats: ClusterStats,
}

fn rekey_all(clusters: &Vec<CachedCluster>, key: LayoutKey) -> Vec<CachedCluster> {
    clusters.iter().map(|c| c.rekeyed(key)).collect()
}

impl Default for ClusterCache {
    fn default() -> Self {
        Self::new(DEFAULT_CLUSTER_CAPACITY)
    }
}

impl ClusterCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            timeline: Timeline::new(),
            last_accessed: HashMap::new(),
            tick: 0,
            capacity: capacity.max(1),
            stats: ClusterStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn stats(&self) -> ClusterStats {
        self.stats
    }

    pub fn exists(&self, key: &LayoutKey) -> bool {
        self.timeline.contains(key)
    }

    pub fn provenance(&self, key: &LayoutKey) -> Option<Provenance> {
        self.timeline.get(key).map(|e| e.provenance)
    }

    /// Tick of the last read or write of `key`
    pub fn last_accessed(&self, key: &LayoutKey) -> Option<u64> {
        self.last_accessed.get(key).copied()
    }

    fn touch(&mut self, key: LayoutKey) {
        self.tick += 1;
        self.last_accessed.insert(key, self.tick);
    }

    /// Clusters for `key`; copies the closest prior entry on a miss
    pub fn load(&mut self, key: LayoutKey) -> Vec<CachedCluster> {
        if let Some(entry) = self.timeline.get(&key) {
            let clusters = entry.value.clone();
            self.stats.hits += 1;
            self.touch(key);
            return clusters;
        }

        match self.timeline.inherit_from_prior(key, rekey_all) {
            Some(prior) => {
                self.stats.prior_fallbacks += 1;
                tracing::debug!(key = %key, from = %prior, "Cluster miss, copied closest prior");
                self.touch(key);
                let clusters = self
                    .timeline
                    .get(&key)
                    .map(|e| e.value.clone())
                    .unwrap_or_default();
                self.evict();
                clusters
            }
            None => {
                self.stats.misses += 1;
                tracing::debug!(key = %key, "Cluster miss with no prior entry");
                Vec::new()
            }
        }
    }

    /// Explicitly store `clusters` at `key` and propagate forward
    pub fn save(&mut self, key: LayoutKey, clusters: Vec<CachedCluster>) {
        let clusters = rekey_all(&clusters, key);
        let propagated = self.timeline.write_explicit(key, clusters, rekey_all);
        for k in &propagated {
            self.touch(*k);
        }
        self.touch(key);
        self.stats.saves += 1;
        self.stats.propagated += propagated.len() as u64;
        tracing::debug!(key = %key, propagated = propagated.len(), "Clusters saved");
        self.evict();
    }

    /// Explicitly clear the clusters at `key`
    pub fn reset(&mut self, key: LayoutKey) {
        self.save(key, Vec::new());
        tracing::info!(key = %key, "Clusters reset");
    }

    /// Drop least recently accessed entries until within capacity
    fn evict(&mut self) {
        let excess = self.timeline.len().saturating_sub(self.capacity);
        if excess == 0 {
            return;
        }

        let mut by_age: Vec<(u64, LayoutKey)> = self
            .timeline
            .keys()
            .map(|k| (self.last_accessed.get(k).copied().unwrap_or(0), *k))
            .collect();
        by_age.sort_unstable();

        for (_, key) in by_age.into_iter().take(excess) {
            self.timeline.remove(&key);
            self.last_accessed.remove(&key);
            self.stats.evictions += 1;
            tracing::debug!(key = %key, "Evicted cluster entry");
        }
    }

    pub fn entries(&self) -> Vec<(LayoutKey, Entry<Vec<CachedCluster>>)> {
        self.timeline.iter().map(|(k, e)| (*k, e.clone())).collect()
    }

    /// Replace the cache content; entries are touched in key order
    pub fn restore(&mut self, entries: Vec<(LayoutKey, Entry<Vec<CachedCluster>>)>) {
        let count = entries.len();
        self.timeline.replace_all(entries);
        self.last_accessed.clear();
        let keys: Vec<LayoutKey> = self.timeline.keys().copied().collect();
        for key in keys {
            self.touch(key);
        }
        self.evict();
        tracing::info!(entries = count, kept = self.len(), "Cluster cache restored");
    }
}
