//! Client-side cache of backend reads.
//!
//! Entries are keyed by [`QueryKey`] and served while fresh. A stale, missing
//! or invalidated entry is re-fetched on the next read, and concurrent readers
//! of the same key share one in-flight fetch.
//!
//! Every fetch is tagged with a generation drawn from a cache-wide counter.
//! Invalidation and `clear` move the entry to a new generation and detach the
//! in-flight fetch, so a response that was requested before a mutation or a
//! user change is handed to the readers that were already waiting on it but
//! never stored.

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, warn};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;

use super::query_config::QueryConfig;
use super::query_key::{QueryKey, QueryValue};
use crate::errors::{Error, GatewayResult};

type SharedFetch = Shared<BoxFuture<'static, GatewayResult<QueryValue>>>;

/// Observable state of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Nothing cached and nothing being fetched.
    Missing,
    /// A value is cached and will be served without a fetch.
    Fresh,
    /// A value is cached but the next read re-fetches it.
    Stale,
    /// A fetch is outstanding and at least one reader is waiting on it.
    Fetching,
}

struct CacheEntry {
    value: Option<QueryValue>,
    fetched_at: Option<Instant>,
    invalidated: bool,
    generation: u64,
    in_flight: Option<SharedFetch>,
    waiters: usize,
}

impl CacheEntry {
    fn empty() -> Self {
        Self {
            value: None,
            fetched_at: None,
            invalidated: false,
            generation: 0,
            in_flight: None,
            waiters: 0,
        }
    }

    fn is_fresh(&self, config: &QueryConfig, now: Instant) -> bool {
        match (&self.value, self.fetched_at) {
            (Some(_), Some(at)) => !self.invalidated && now.duration_since(at) < config.stale_time,
            _ => false,
        }
    }

    fn state(&self, config: &QueryConfig, now: Instant) -> EntryState {
        if self.in_flight.is_some() {
            EntryState::Fetching
        } else if self.is_fresh(config, now) {
            EntryState::Fresh
        } else if self.value.is_some() {
            EntryState::Stale
        } else {
            EntryState::Missing
        }
    }
}

/// Shared read model cache.
pub struct ReadModelCache {
    entries: DashMap<QueryKey, CacheEntry>,
    config: QueryConfig,
    fetches: AtomicU64,
    generations: AtomicU64,
}

impl Default for ReadModelCache {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}

impl ReadModelCache {
    pub fn new(config: QueryConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            fetches: AtomicU64::new(0),
            generations: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Returns the value for `key`, fetching it with `fetcher` unless a fresh
    /// value is cached. Joins an outstanding fetch for the same key instead of
    /// starting a second one.
    ///
    /// A failed fetch leaves any previously cached value in place.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> GatewayResult<QueryValue>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = GatewayResult<QueryValue>> + Send + 'static,
    {
        let (fetch, generation) = {
            let mut entry = self
                .entries
                .entry(key.clone())
                .or_insert_with(CacheEntry::empty);

            if entry.is_fresh(&self.config, Instant::now()) {
                if let Some(value) = entry.value.clone() {
                    debug!("[ReadModelCache] hit {}", key.label());
                    return Ok(value);
                }
            }

            match entry.in_flight.clone() {
                Some(in_flight) => {
                    debug!("[ReadModelCache] joining in-flight fetch for {}", key.label());
                    entry.waiters += 1;
                    (in_flight, entry.generation)
                }
                None => {
                    debug!("[ReadModelCache] miss {}", key.label());
                    entry.generation = self.next_generation();
                    entry.waiters = 1;
                    self.fetches.fetch_add(1, Ordering::Relaxed);
                    let fetch = fetch_with_retry(key.clone(), fetcher, self.config)
                        .boxed()
                        .shared();
                    entry.in_flight = Some(fetch.clone());
                    (fetch, entry.generation)
                }
            }
        };

        let _waiter = Waiter {
            cache: self,
            key: key.clone(),
            generation,
        };
        let result = fetch.await;

        if let Some(mut entry) = self.entries.get_mut(&key) {
            if entry.generation == generation {
                entry.in_flight = None;
                if let Ok(value) = &result {
                    entry.value = Some(value.clone());
                    entry.fetched_at = Some(Instant::now());
                    entry.invalidated = false;
                }
            } else {
                debug!(
                    "[ReadModelCache] dropping {} response requested before invalidation",
                    key.label()
                );
            }
        }

        result
    }

    /// Marks `key` stale so the next read re-fetches it.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            self.mark_invalidated(&mut entry);
            debug!("[ReadModelCache] invalidated {}", key.label());
        }
    }

    pub fn invalidate_many(&self, keys: &[QueryKey]) {
        for key in keys {
            self.invalidate(key);
        }
    }

    /// Invalidates every entry whose key satisfies `predicate`.
    pub fn invalidate_where<P>(&self, predicate: P)
    where
        P: Fn(&QueryKey) -> bool,
    {
        for mut item in self.entries.iter_mut() {
            if predicate(item.key()) {
                debug!("[ReadModelCache] invalidated {}", item.key().label());
                self.mark_invalidated(item.value_mut());
            }
        }
    }

    /// Drops every entry, e.g. when the signed-in user changes.
    ///
    /// Generations are never reused, so a fetch started before the call cannot
    /// store its response in an entry created afterwards.
    pub fn clear(&self) {
        self.entries.clear();
        debug!("[ReadModelCache] cleared");
    }

    /// The cached value for `key`, fresh or not, without fetching.
    pub fn peek(&self, key: &QueryKey) -> Option<QueryValue> {
        self.entries.get(key).and_then(|entry| entry.value.clone())
    }

    pub fn state(&self, key: &QueryKey) -> EntryState {
        self.entries
            .get(key)
            .map(|entry| entry.state(&self.config, Instant::now()))
            .unwrap_or(EntryState::Missing)
    }

    /// True when the next read of `key` will hit the gateway.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        !matches!(self.state(key), EntryState::Fresh)
    }

    /// Number of fetches started since creation.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn mark_invalidated(&self, entry: &mut CacheEntry) {
        entry.invalidated = true;
        entry.generation = self.next_generation();
        entry.in_flight = None;
        entry.waiters = 0;
    }
}

/// One reader of a shared fetch. When the last reader of a generation goes
/// away before the fetch completes, the abandoned fetch is detached.
struct Waiter<'a> {
    cache: &'a ReadModelCache,
    key: QueryKey,
    generation: u64,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        if let Some(mut entry) = self.cache.entries.get_mut(&self.key) {
            if entry.generation != self.generation {
                return;
            }
            entry.waiters = entry.waiters.saturating_sub(1);
            if entry.waiters == 0 && entry.in_flight.take().is_some() {
                debug!(
                    "[ReadModelCache] every reader of {} went away, fetch abandoned",
                    self.key.label()
                );
            }
        }
    }
}

async fn fetch_with_retry<F, Fut>(
    key: QueryKey,
    fetcher: F,
    config: QueryConfig,
) -> GatewayResult<QueryValue>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GatewayResult<QueryValue>> + Send + 'static,
{
    let mut attempt = 0;
    loop {
        match fetcher().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < config.retry => {
                let delay = config.backoff(attempt);
                warn!(
                    "[ReadModelCache] fetching {} failed ({}), retrying in {:?}",
                    key.label(),
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Error for a cached value whose variant does not match its key.
pub(crate) fn unexpected_value(key: &QueryKey) -> Error {
    Error::Unexpected(format!(
        "cached value for '{}' has an unexpected type",
        key.label()
    ))
}
