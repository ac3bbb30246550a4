//! Cache Store Module
//!
//! Main storage engine: a bounded URI -> variant family table with pluggable
//! eviction, safe to share between threads.
//!
//! # Concurrency
//! Every change to one URI's family happens inside a single shard-locked
//! read-modify-write on the table. New URIs are only admitted while holding
//! the policy lock, which is what keeps the table within its capacity. Locks
//! are always taken policy first, then table shard; paths that hold a shard
//! never block on the policy.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{
    materialize, CacheItem, CacheStats, EvictionPolicy, Key, StatsCounter, VariantMap, Vary,
};
use crate::config::Config;
use crate::error::{Result, StorageError};
use crate::models::{CacheRequest, HttpResponse};
use crate::tasks::{MaintenancePool, RemovalCause, RemovalListener};

// == Cache Store ==
/// Bounded, concurrent storage for cached responses.
#[derive(Debug)]
pub struct CacheStore {
    /// URI -> variant family, never holding an empty family
    table: DashMap<Url, VariantMap>,
    /// Eviction order; tracks every URI in `table` (possibly a few stale ones)
    policy: Mutex<Box<dyn EvictionPolicy<Url>>>,
    /// Performance statistics
    stats: StatsCounter,
    /// Worker pool finishing removals
    maintenance: MaintenancePool,
    /// Maximum number of URI families allowed
    max_entries: usize,
    shut_down: AtomicBool,
}

impl CacheStore {
    // == Constructors ==
    /// Creates a store holding at most `max_entries` URIs, with default settings otherwise.
    pub fn new(max_entries: usize) -> Result<Self> {
        Self::from_config(&Config::default().with_max_entries(max_entries))
    }

    /// Creates a store from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::build(config, None)
    }

    /// Creates a store that reports every removed URI family to `listener`.
    ///
    /// The listener runs on the maintenance pool, never on the caller's thread.
    pub fn with_listener(config: &Config, listener: RemovalListener) -> Result<Self> {
        Self::build(config, Some(listener))
    }

    fn build(config: &Config, listener: Option<RemovalListener>) -> Result<Self> {
        let maintenance = MaintenancePool::start(config.eviction_threads, listener)?;
        info!(
            "Cache store initialized: max_entries={}, policy={}",
            config.max_entries, config.policy
        );
        Ok(Self {
            table: DashMap::new(),
            policy: Mutex::new(config.policy.build()),
            stats: StatsCounter::new(),
            maintenance,
            max_entries: config.max_entries,
            shut_down: AtomicBool::new(false),
        })
    }

    // == Insert ==
    /// Stores `response` as the answer to `request` and returns the stored copy.
    ///
    /// The body is read into memory first, so the returned response can be
    /// served to the caller while the same bytes stay cached. Any entry with
    /// the same URI and Vary selector is replaced.
    ///
    /// # Errors
    /// - `NotCacheable` if the body cannot be read; the store is left untouched
    /// - `ShutDown` after `shutdown()`
    pub fn insert(&self, request: &CacheRequest, response: HttpResponse) -> Result<HttpResponse> {
        self.ensure_running()?;

        let key = Key::create(request, &response);
        let materialized = materialize(response).map_err(|err| {
            debug!(key = %key, error = %err, "refusing to cache response");
            err
        })?;

        self.remove_variant(&key);
        self.put(key, materialized.clone());
        self.stats.record_insert();

        Ok(materialized)
    }

    // == Update ==
    /// Stores `response` verbatim, overwriting whatever is under its key.
    ///
    /// Meant for responses whose body is already reusable, such as a
    /// revalidated response carrying a previously materialized payload.
    ///
    /// # Errors
    /// `ShutDown` after `shutdown()`.
    pub fn update(&self, request: &CacheRequest, response: HttpResponse) -> Result<HttpResponse> {
        self.ensure_running()?;

        let key = Key::create(request, &response);
        self.put(key, response.clone());
        self.stats.record_update();

        Ok(response)
    }

    // == Get ==
    /// Exact lookup by URI and Vary selector.
    pub fn get(&self, key: &Key) -> Option<CacheItem> {
        if self.is_shut_down() {
            return None;
        }

        let item = self
            .table
            .get(key.uri())
            .and_then(|variants| variants.get(key.vary()).cloned());
        self.finish_lookup(key.uri(), item)
    }

    // == Get For Request ==
    /// Finds the stored variant usable for `request`.
    ///
    /// When several stored selectors match, the most recently stored one wins.
    pub fn get_for_request(&self, request: &CacheRequest) -> Option<CacheItem> {
        if self.is_shut_down() {
            return None;
        }

        let uri = request.normalized_uri();
        let item = self
            .table
            .get(uri)
            .and_then(|variants| variants.find(request).cloned());
        self.finish_lookup(uri, item)
    }

    // == Invalidate ==
    /// Removes every variant stored for `uri`. Absent URIs are ignored.
    pub fn invalidate_uri(&self, uri: &Url) {
        if self.is_shut_down() {
            return;
        }
        self.remove_family(uri);
    }

    /// Removes a single variant, dropping the URI once its last variant is gone.
    pub fn invalidate_key(&self, key: &Key) {
        if self.is_shut_down() {
            return;
        }
        self.remove_variant(key);
    }

    // == Clear ==
    /// Removes every entry.
    ///
    /// Entries inserted concurrently with the sweep may survive it.
    pub fn clear(&self) {
        if self.is_shut_down() {
            return;
        }
        self.clear_entries();
    }

    // == Size ==
    /// Number of URIs currently stored.
    pub fn size(&self) -> usize {
        if self.is_shut_down() {
            return 0;
        }
        self.table.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of variants stored for `uri`.
    pub fn variant_count(&self, uri: &Url) -> usize {
        self.table.get(uri).map(|variants| variants.len()).unwrap_or(0)
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // == Keys ==
    /// Lazily lists every stored key.
    ///
    /// The URI set is captured up front; each URI's variants are read when
    /// the iterator reaches it, so concurrent changes may or may not show.
    /// No table lock is held between calls to `next`.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        let uris: Vec<Url> = if self.is_shut_down() {
            Vec::new()
        } else {
            self.table.iter().map(|entry| entry.key().clone()).collect()
        };

        uris.into_iter().flat_map(move |uri| {
            self.table
                .get(&uri)
                .map(|variants| {
                    variants
                        .varies()
                        .map(|vary| Key::new(uri.clone(), vary.clone()))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
    }

    // == Stats ==
    /// Returns current storage statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.size())
    }

    // == Shutdown ==
    /// Clears the store and stops the maintenance pool.
    ///
    /// Afterwards `insert` and `update` fail with `ShutDown`, lookups find
    /// nothing and removals are no-ops. Calling it again does nothing.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.clear_entries();
        self.maintenance.shutdown();
        info!("Cache store shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    // == Internals ==
    fn ensure_running(&self) -> Result<()> {
        if self.is_shut_down() {
            warn!("Cache store used after shutdown");
            return Err(StorageError::ShutDown);
        }
        Ok(())
    }

    fn finish_lookup(&self, uri: &Url, item: Option<CacheItem>) -> Option<CacheItem> {
        self.stats.record_lookup(item.is_some());
        if item.is_some() {
            self.record_access(uri);
        }
        item
    }

    /// Best effort: skipped when another thread holds the policy.
    fn record_access(&self, uri: &Url) {
        if let Some(mut policy) = self.policy.try_lock() {
            policy.record_access(uri);
        }
    }

    fn put(&self, key: Key, response: HttpResponse) {
        let (uri, vary) = key.into_parts();
        let item = CacheItem::new(response);

        if let Some(mut variants) = self.table.get_mut(&uri) {
            variants.put(vary, item);
            drop(variants);
            self.record_access(&uri);
            return;
        }

        self.admit(uri, vary, item);
    }

    /// Adds an entry whose URI was absent, evicting first if the table is full.
    fn admit(&self, uri: Url, vary: Vary, item: CacheItem) {
        if self.max_entries == 0 {
            debug!(uri = %uri, "capacity is zero, not storing");
            return;
        }

        let mut policy = self.policy.lock();
        if !self.table.contains_key(&uri) {
            while self.table.len() >= self.max_entries {
                let Some(victim) = policy.victim() else {
                    break;
                };
                // Stale victims were already removed from the table
                if let Some((victim, variants)) = self.table.remove(&victim) {
                    debug!(uri = %victim, "evicting cache entry");
                    self.stats.record_eviction();
                    self.maintenance.submit(victim, variants, RemovalCause::Size);
                }
            }
        }

        self.table.entry(uri.clone()).or_default().put(vary, item);
        policy.record_insert(&uri);
    }

    fn remove_family(&self, uri: &Url) {
        if let Some((uri, variants)) = self.table.remove(uri) {
            debug!(uri = %uri, variants = variants.len(), "invalidated cache entry");
            self.stats.record_invalidation();
            self.forget(&uri);
            self.maintenance.submit(uri, variants, RemovalCause::Explicit);
        }
    }

    fn remove_variant(&self, key: &Key) {
        let mut removed = None;
        let family = self.table.remove_if_mut(key.uri(), |_, variants| {
            removed = variants.remove(key.vary());
            variants.is_empty()
        });

        if let Some((uri, mut variants)) = family {
            if let Some(item) = removed {
                variants.put(key.vary().clone(), item);
            }
            debug!(key = %key, "invalidated last variant");
            self.stats.record_invalidation();
            self.forget(&uri);
            self.maintenance.submit(uri, variants, RemovalCause::Explicit);
        }
    }

    /// Drops `uri` from the policy unless it was re-admitted meanwhile.
    fn forget(&self, uri: &Url) {
        let mut policy = self.policy.lock();
        if !self.table.contains_key(uri) {
            policy.remove(uri);
        }
    }

    fn clear_entries(&self) {
        let uris: Vec<Url> = self.table.iter().map(|entry| entry.key().clone()).collect();
        let count = uris.len();
        for uri in uris {
            self.remove_family(&uri);
        }
        info!("Cleared {} cache entries", count);
    }
}
