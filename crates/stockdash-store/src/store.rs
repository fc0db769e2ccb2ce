//! Keyed resource store.

use std::collections::HashMap;
use std::sync::Arc;

use stockdash_core::{NestedRecord, ResourceFetcher, ResourceKey, Result};
use tokio::sync::{RwLock, watch};
use tracing::{debug, instrument, warn};

use crate::state::{ResourceState, Status};

type Entry = Arc<watch::Sender<ResourceState>>;

/// Holds one [`ResourceState`] per [`ResourceKey`].
///
/// States are mutated only through the transition methods below. Each key's
/// state lives in a `watch` channel, so check-and-set transitions are atomic
/// and any number of views can follow a key through [`subscribe`].
/// Entries are never evicted on their own; revisiting a key serves the cached
/// state.
///
/// [`subscribe`]: ResourceStore::subscribe
#[derive(Debug, Default)]
pub struct ResourceStore {
    entries: RwLock<HashMap<ResourceKey, Entry>>,
}

impl ResourceStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `key`, creating an `Idle` one on first reference.
    async fn entry(&self, key: &ResourceKey) -> Entry {
        if let Some(entry) = self.entries.read().await.get(key) {
            return Arc::clone(entry);
        }

        let mut entries = self.entries.write().await;
        let entry = entries.entry(key.clone()).or_insert_with(|| {
            debug!(key = %key, "Tracking new resource");
            Arc::new(watch::channel(ResourceState::default()).0)
        });
        Arc::clone(entry)
    }

    /// Returns the current state of `key`, creating it as `Idle` if unseen.
    pub async fn state(&self, key: &ResourceKey) -> ResourceState {
        self.entry(key).await.borrow().clone()
    }

    /// Returns the current state of `key` without creating it.
    pub async fn peek(&self, key: &ResourceKey) -> Option<ResourceState> {
        self.entries
            .read()
            .await
            .get(key)
            .map(|entry| entry.borrow().clone())
    }

    /// Returns a receiver that observes every transition of `key`.
    pub async fn subscribe(&self, key: &ResourceKey) -> watch::Receiver<ResourceState> {
        self.entry(key).await.subscribe()
    }

    /// Waits until `key` is not `Loading` and returns its state.
    pub async fn settled(&self, key: &ResourceKey) -> ResourceState {
        let entry = self.entry(key).await;
        let mut rx = entry.subscribe();
        if let Ok(state) = rx.wait_for(|s| !s.is_loading()).await {
            return state.clone();
        }
        // The sender lives in `entry`, so the channel cannot close here.
        entry.borrow().clone()
    }

    /// Loads `key` unless it is already loading or has a result.
    ///
    /// From `Idle` the key moves to `Loading` and `fetcher` is called; the
    /// returned state is the one left behind by this fetch. Otherwise nothing
    /// is fetched and the current state is returned immediately, so callers
    /// racing an in-flight fetch share it and can wait with [`settled`].
    ///
    /// If the returned future is dropped before the fetch completes, the key
    /// goes back to `Idle` under a new generation and the next call fetches
    /// again.
    ///
    /// [`settled`]: ResourceStore::settled
    #[instrument(skip(self, key, fetcher), fields(key = %key, fetcher = fetcher.name()))]
    pub async fn ensure_loaded<F>(&self, key: &ResourceKey, fetcher: &F) -> ResourceState
    where
        F: ResourceFetcher + ?Sized,
    {
        let entry = self.entry(key).await;

        let mut captured = None;
        entry.send_if_modified(|state| {
            if state.status != Status::Idle {
                return false;
            }
            state.status = Status::Loading;
            captured = Some(state.generation);
            true
        });

        let Some(generation) = captured else {
            let state = entry.borrow().clone();
            debug!(status = ?state.status, "Already requested, not fetching");
            return state;
        };

        debug!(generation, "Fetching resource");
        let pending = Pending::new(&entry, key, generation);
        let outcome = fetcher.fetch(key).await;
        pending.settle(outcome, |_, data| data, false);

        let state = entry.borrow().clone();
        state
    }

    /// Fetches `key` regardless of its status and merges the result.
    ///
    /// Starts a new generation, so any fetch already in flight for `key`
    /// becomes stale. Previous data stays visible while loading. On success
    /// the stored data becomes `merge(previous, fetched)`; on failure the
    /// error is recorded and previous data is kept. If the future is dropped
    /// mid-fetch, the key returns to `Loaded` when it still holds data and to
    /// `Idle` otherwise.
    #[instrument(skip(self, key, fetcher, merge), fields(key = %key, fetcher = fetcher.name()))]
    pub async fn force_refresh<F, M>(
        &self,
        key: &ResourceKey,
        fetcher: &F,
        merge: M,
    ) -> ResourceState
    where
        F: ResourceFetcher + ?Sized,
        M: FnOnce(Option<&NestedRecord>, NestedRecord) -> NestedRecord,
    {
        let entry = self.entry(key).await;

        let mut generation = 0;
        entry.send_modify(|state| {
            state.generation += 1;
            state.status = Status::Loading;
            state.error = None;
            generation = state.generation;
        });

        debug!(generation, "Refreshing resource");
        let pending = Pending::new(&entry, key, generation);
        let outcome = fetcher.fetch(key).await;
        pending.settle(outcome, merge, true);

        let state = entry.borrow().clone();
        state
    }

    /// Resets `key` to `Idle` under a new generation, dropping its data and
    /// error. Any in-flight response for the key will be discarded.
    ///
    /// Keys the store has never seen are left alone.
    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn invalidate(&self, key: &ResourceKey) {
        let entry = self.entries.read().await.get(key).cloned();
        if let Some(entry) = entry {
            entry.send_modify(reset);
            debug!("Invalidated resource");
        }
    }

    /// Invalidates every tracked key matching `predicate`.
    ///
    /// Returns the number of keys invalidated.
    pub async fn invalidate_matching<P>(&self, predicate: P) -> usize
    where
        P: Fn(&ResourceKey) -> bool,
    {
        let entries = self.entries.read().await;
        let mut count = 0usize;
        for (key, entry) in entries.iter().filter(|(key, _)| predicate(*key)) {
            entry.send_modify(reset);
            debug!(key = %key, "Invalidated resource");
            count += 1;
        }
        count
    }

    /// Returns every tracked key.
    pub async fn keys(&self) -> Vec<ResourceKey> {
        self.entries.read().await.keys().cloned().collect()
    }

    /// Returns the number of tracked keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if no key is tracked.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Forgets every key. Responses still in flight land on detached entries
    /// and are never observed.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        debug!("Cleared all resources");
    }
}

fn reset(state: &mut ResourceState) {
    state.generation += 1;
    state.status = Status::Idle;
    state.data = None;
    state.error = None;
}

/// A fetch that owns the `Loading` status of one generation.
///
/// Dropped without [`Pending::settle`], it releases the key for the next
/// request.
struct Pending<'a> {
    entry: &'a watch::Sender<ResourceState>,
    key: &'a ResourceKey,
    generation: u64,
    armed: bool,
}

impl<'a> Pending<'a> {
    const fn new(
        entry: &'a watch::Sender<ResourceState>,
        key: &'a ResourceKey,
        generation: u64,
    ) -> Self {
        Self {
            entry,
            key,
            generation,
            armed: true,
        }
    }

    fn settle<M>(mut self, outcome: Result<NestedRecord>, merge: M, keep_data_on_error: bool)
    where
        M: FnOnce(Option<&NestedRecord>, NestedRecord) -> NestedRecord,
    {
        self.armed = false;
        settle(self.entry, self.key, self.generation, outcome, merge, keep_data_on_error);
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let (key, generation) = (self.key, self.generation);
        self.entry.send_if_modified(|state| {
            if state.generation != generation || !state.is_loading() {
                return false;
            }
            state.generation += 1;
            state.status = if state.data.is_some() {
                Status::Loaded
            } else {
                Status::Idle
            };
            debug!(key = %key, generation, "Fetch abandoned, key released");
            true
        });
    }
}

/// Applies a fetch outcome if `generation` is still current.
fn settle<M>(
    entry: &watch::Sender<ResourceState>,
    key: &ResourceKey,
    generation: u64,
    outcome: Result<NestedRecord>,
    merge: M,
    keep_data_on_error: bool,
) where
    M: FnOnce(Option<&NestedRecord>, NestedRecord) -> NestedRecord,
{
    entry.send_if_modified(|state| {
        if state.generation != generation {
            debug!(
                key = %key,
                captured = generation,
                current = state.generation,
                "Discarding stale response"
            );
            return false;
        }

        match outcome {
            Ok(data) => {
                let merged = merge(state.data.as_ref(), data);
                state.data = Some(merged);
                state.error = None;
                state.status = Status::Loaded;
                debug!(key = %key, generation, "Resource loaded");
            }
            Err(error) => {
                warn!(key = %key, generation, error = %error, "Resource fetch failed");
                if !keep_data_on_error {
                    state.data = None;
                }
                state.error = Some(error);
                state.status = Status::Failed;
            }
        }
        true
    });
}
