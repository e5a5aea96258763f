//! Page cache for incremental regeneration
//!
//! Rendered pages are kept in memory keyed by path. An entry with a
//! revalidation interval turns stale once the interval has elapsed; it is
//! still served while one background build replaces it. Paths that were
//! never rendered are built on first request, and concurrent requests for
//! the same path see it as `Building` until the first build finishes.

use axum::body::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// A rendered page
#[derive(Debug, Clone)]
struct CacheEntry {
    html: Bytes,
    rendered_at: Instant,
    /// `None` never expires
    revalidate: Option<Duration>,
}

impl CacheEntry {
    fn is_stale(&self, now: Instant) -> bool {
        match self.revalidate {
            Some(revalidate) => now.saturating_duration_since(self.rendered_at) >= revalidate,
            None => false,
        }
    }
}

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Cached and within its revalidation interval
    Fresh(Bytes),
    /// Cached but due for regeneration
    Stale(Bytes),
    /// Not cached, a build is in progress
    Building,
    /// Not cached
    Missing,
}

/// Shared in-memory page store
#[derive(Debug, Default)]
pub struct PageCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    building: Mutex<HashSet<String>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &str) -> Lookup {
        self.lookup_at(key, Instant::now())
    }

    fn lookup_at(&self, key: &str, now: Instant) -> Lookup {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.is_stale(now) => Lookup::Stale(entry.html.clone()),
            Some(entry) => Lookup::Fresh(entry.html.clone()),
            None if self.is_building(key) => Lookup::Building,
            None => Lookup::Missing,
        }
    }

    /// Store a rendered page, replacing any previous version
    ///
    /// The returned body shares its buffer with the cached copy.
    pub fn insert(&self, key: &str, html: String, revalidate: Option<Duration>) -> Bytes {
        let html = Bytes::from(html);
        let entry = CacheEntry {
            html: html.clone(),
            rendered_at: Instant::now(),
            revalidate,
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), entry);
        tracing::debug!("Cached: {}", key);
        html
    }

    pub fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Claim the right to build `key`; `None` if another build holds it
    ///
    /// The claim is released when the guard is dropped.
    pub fn begin_build(self: &Arc<Self>, key: &str) -> Option<BuildGuard> {
        let mut building = self.building.lock().unwrap_or_else(PoisonError::into_inner);
        if !building.insert(key.to_string()) {
            return None;
        }
        Some(BuildGuard {
            cache: Arc::clone(self),
            key: key.to_string(),
        })
    }

    pub fn is_building(&self, key: &str) -> bool {
        self.building
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// Cached paths, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive build claim on one cache key
#[derive(Debug)]
pub struct BuildGuard {
    cache: Arc<PageCache>,
    key: String,
}

impl BuildGuard {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Store the built page and release the claim
    pub fn finish(self, html: String, revalidate: Option<Duration>) -> Bytes {
        self.cache.insert(&self.key, html, revalidate)
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        self.cache
            .building
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
