// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory memoization of generated solids.
//!
//! Masters are stored behind `Arc` and never handed out directly: every
//! caller receives its own deep copy, so tag or position edits on one copy
//! cannot reach another caller or the master.

use crate::error::Result;
use polyframe_geometry::GeometryBuffer;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Hit, miss and size counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Default)]
struct CacheInner {
    entries: FxHashMap<String, Arc<GeometryBuffer>>,
    /// Insertion order, used for FIFO eviction
    order: VecDeque<String>,
}

/// Key → master buffer store, safe for concurrent use.
#[derive(Default)]
pub struct GeometryCache {
    inner: RwLock<CacheInner>,
    capacity: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GeometryCache {
    /// Unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that evicts the oldest entry beyond `capacity` entries.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Return a copy of the master stored under `key`, building it on a miss.
    ///
    /// A `None` key means the options could not be encoded: the builder runs
    /// every time and nothing is stored. Builder errors are returned and not
    /// cached.
    pub fn get_or_build<F>(&self, key: Option<&str>, build: F) -> Result<GeometryBuffer>
    where
        F: FnOnce() -> Result<GeometryBuffer>,
    {
        let Some(key) = key else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Options not encodable, bypassing geometry cache");
            return build();
        };

        if let Some(master) = self.lookup(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok((*master).clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        // Build outside the lock; a concurrent build of the same key simply overwrites
        let master = Arc::new(build()?);
        let copy = (*master).clone();
        self.store(key, master);
        Ok(copy)
    }

    /// Copy of the master under `key`, if cached.
    pub fn get(&self, key: &str) -> Option<GeometryBuffer> {
        self.lookup(key).map(|master| (*master).clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.write();
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn lookup(&self, key: &str) -> Option<Arc<GeometryBuffer>> {
        self.read().entries.get(key).map(Arc::clone)
    }

    fn store(&self, key: &str, master: Arc<GeometryBuffer>) {
        let mut inner = self.write();
        if inner.entries.insert(key.to_string(), master).is_none() {
            inner.order.push_back(key.to_string());
        }
        if let Some(capacity) = self.capacity {
            while inner.entries.len() > capacity {
                let Some(oldest) = inner.order.pop_front() else {
                    break;
                };
                inner.entries.remove(&oldest);
                tracing::debug!(key = %oldest, capacity, "Evicted cached geometry");
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CacheInner> {
        // Entries are only ever replaced whole, so a poisoned map is still consistent
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CacheInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyframe_geometry::{build_base, BaseSolid, ShapeTags};
    use std::cell::Cell;

    fn cube() -> Result<GeometryBuffer> {
        Ok(build_base(BaseSolid::Cube, 1.0))
    }

    #[test]
    fn test_builds_once_and_copies() {
        let cache = GeometryCache::new();
        let calls = Cell::new(0);
        let build = || {
            calls.set(calls.get() + 1);
            cube()
        };

        let a = cache.get_or_build(Some("box:default"), build).unwrap();
        let b = cache.get_or_build(Some("box:default"), build).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(a.positions, b.positions);
        assert_ne!(a.positions.as_ptr(), b.positions.as_ptr());
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, entries: 1 });
    }

    #[test]
    fn test_copies_do_not_share_tags() {
        let cache = GeometryCache::new();
        let a = cache.get_or_build(Some("k"), cube).unwrap();
        let renamed = a.with_tags(ShapeTags::single(polyframe_geometry::ShapeKind::Surface));
        let b = cache.get("k").unwrap();
        assert_eq!(b.tags().kind(), polyframe_geometry::ShapeKind::Cube);
        assert_ne!(renamed.tags(), b.tags());
    }

    #[test]
    fn test_missing_key_always_rebuilds() {
        let cache = GeometryCache::new();
        let calls = Cell::new(0);
        for _ in 0..3 {
            cache
                .get_or_build(None, || {
                    calls.set(calls.get() + 1);
                    cube()
                })
                .unwrap();
        }
        assert_eq!(calls.get(), 3);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = GeometryCache::new();
        let failed = cache.get_or_build(Some("k"), || {
            Err(polyframe_geometry::Error::invalid("bad size").into())
        });
        assert!(failed.is_err());
        assert!(!cache.contains("k"));
    }

    #[test]
    fn test_fifo_eviction() {
        let cache = GeometryCache::with_capacity(Some(2));
        for key in ["a", "b", "c"] {
            cache.get_or_build(Some(key), cube).unwrap();
        }
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }
}
