//! Per-document region cache keyed by document identity and revision.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use super::region::{Region, RegionScanner, RegionSource};

/// Cached regions for one document revision.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub revision: i32,
    pub regions: Arc<[Region]>,
    /// Last access tick, used to pick an eviction victim when capped.
    last_used: u64,
}

/// Memoizes region extraction per document.
///
/// An entry is valid only while its revision matches the document's current
/// revision. Entries are dropped on [`invalidate`](Self::invalidate); without a
/// capacity the map is otherwise unbounded, so a missed close notification
/// leaks one entry per document.
#[derive(Debug)]
pub struct RegionCache<E = RegionScanner> {
    extractor: E,
    entries: DashMap<Url, CacheEntry>,
    capacity: Option<usize>,
    clock: AtomicU64,
}

impl RegionCache<RegionScanner> {
    /// Unbounded cache using the default `<?php ... ?>` scanner.
    pub fn new() -> Self {
        Self::with_extractor(RegionScanner::default())
    }
}

impl Default for RegionCache<RegionScanner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RegionSource> RegionCache<E> {
    pub fn with_extractor(extractor: E) -> Self {
        Self {
            extractor,
            entries: DashMap::new(),
            capacity: None,
            clock: AtomicU64::new(0),
        }
    }

    /// Cap the number of cached documents. Least recently used entries are
    /// evicted first. A capacity of zero is treated as one.
    pub fn with_capacity(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity.map(|c| c.max(1));
        self
    }

    /// Regions for `uri` at `revision`, scanning `text` only on a miss.
    pub fn get_regions(&self, uri: &Url, revision: i32, text: &str) -> Arc<[Region]> {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);

        if let Some(mut entry) = self.entries.get_mut(uri) {
            if entry.revision == revision {
                entry.last_used = tick;
                log::debug!("region cache hit for {} at revision {}", uri, revision);
                return Arc::clone(&entry.regions);
            }
        }

        let regions: Arc<[Region]> = self.extractor.extract(text).into();
        log::debug!(
            "region cache miss for {} at revision {}: {} region(s)",
            uri,
            revision,
            regions.len()
        );

        if !self.entries.contains_key(uri) {
            self.make_room();
        }
        self.entries.insert(
            uri.clone(),
            CacheEntry {
                revision,
                regions: Arc::clone(&regions),
                last_used: tick,
            },
        );
        regions
    }

    /// Drop the entry for `uri`. Unknown identities are ignored.
    pub fn invalidate(&self, uri: &Url) {
        if self.entries.remove(uri).is_some() {
            log::debug!("region cache invalidated for {}", uri);
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn get(&self, uri: &Url) -> Option<CacheEntry> {
        self.entries.get(uri).map(|e| e.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    fn make_room(&self) {
        let Some(capacity) = self.capacity else {
            return;
        };

        while self.entries.len() >= capacity {
            let victim = self
                .entries
                .iter()
                .min_by_key(|e| e.value().last_used)
                .map(|e| e.key().clone());

            match victim {
                Some(uri) => {
                    log::debug!("region cache full, evicting {}", uri);
                    self.entries.remove(&uri);
                }
                None => break,
            }
        }
    }
}
