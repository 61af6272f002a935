//! De-duplication of concurrent fetches for the same cache key.
//!
//! The first caller for a key starts the fetch and parks a [`Shared`] handle to
//! it here; later callers for the same key clone that handle and await the same
//! outcome instead of issuing their own request. The fetch holds a
//! [`Release`] guard that removes its entry when the fetch finishes or unwinds.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

use crate::{cache::CacheEntry, cache::CacheKey, errors::FetchError};

pub(crate) type Outcome = Result<Arc<CacheEntry>, FetchError>;
pub(crate) type SharedOutcome = Shared<BoxFuture<'static, Outcome>>;

#[derive(Default)]
pub(crate) struct Inflight {
    pending: Mutex<HashMap<CacheKey, SharedOutcome>>,
}

impl Inflight {
    /// Returns the pending fetch for `key`, or registers the one `start` builds.
    ///
    /// `start` is only called when nothing is pending. The future it returns
    /// must release `key` once it has produced its outcome, normally by holding
    /// the guard from [`Inflight::release_on_drop`].
    pub(crate) fn join_or_start<F>(&self, key: &CacheKey, start: F) -> SharedOutcome
    where
        F: FnOnce() -> BoxFuture<'static, Outcome>,
    {
        let mut pending = self.lock();
        if let Some(existing) = pending.get(key) {
            debug!(key = %key, "joining in-flight request");
            return existing.clone();
        }
        let shared = start().shared();
        pending.insert(key.clone(), shared.clone());
        shared
    }

    pub(crate) fn finish(&self, key: &CacheKey) {
        self.lock().remove(key);
    }

    /// Guard that calls [`Inflight::finish`] for `key` when dropped.
    pub(crate) fn release_on_drop<'a>(&'a self, key: &'a CacheKey) -> Release<'a> {
        Release {
            inflight: self,
            key,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, SharedOutcome>> {
        // The map holds no invariants a panicking holder could break.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) struct Release<'a> {
    inflight: &'a Inflight,
    key: &'a CacheKey,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        self.inflight.finish(self.key);
    }
}
