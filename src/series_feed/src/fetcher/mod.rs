//! Per-resource fetch units.
//!
//! A [`ResourceFetcher`] serves one `(resource, entity, period)` triple. Each
//! call to [`ResourceFetcher::fetch`]:
//!
//! 1. returns immediately from the cache when a valid entry exists,
//! 2. otherwise flips `loading` on and asks the shared [`FeedContext`] to
//!    resolve the key (one live call per key, however many callers wait),
//! 3. settles to the live payload, to synthetic data when the fallback policy
//!    allows it, or to an error message with no data.
//!
//! [`ResourceFetcher::refetch`] skips step 1. The latest [`FetchState`] is
//! published on a `watch` channel for anything that wants to observe
//! transitions. Dropping the fetcher (or calling [`ResourceFetcher::cancel`])
//! clears `loading` and stops any pending fetch from publishing data or errors.

mod context;
mod inflight;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub use context::FeedContext;

use crate::{
    cache::{CacheEntry, CacheKey},
    errors::FetchError,
    models::{EntityId, Period, SourceTag},
    resources::Resource,
};

/// `{data, loading, error, source}` as seen by a UI collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct FetchState<T> {
    pub data: Option<Arc<T>>,
    pub loading: bool,
    /// Set only when the latest attempt failed and no fallback applied.
    pub error: Option<String>,
    pub source: Option<SourceTag>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            source: None,
        }
    }
}

impl<T> FetchState<T> {
    fn ready(data: Arc<T>, source: SourceTag) -> Self {
        Self {
            data: Some(data),
            loading: false,
            error: None,
            source: Some(source),
        }
    }

    fn failed(message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::default()
        }
    }

    pub fn is_mock(&self) -> bool {
        self.source == Some(SourceTag::Mock)
    }
}

pub struct ResourceFetcher<R: Resource> {
    ctx: Arc<FeedContext>,
    key: CacheKey,
    state: watch::Sender<FetchState<R::Data>>,
    cancel: CancellationToken,
}

impl<R: Resource> ResourceFetcher<R> {
    pub fn new(ctx: Arc<FeedContext>, entity: EntityId, period: Period) -> Self {
        Self::with_token(ctx, entity, period, CancellationToken::new())
    }

    /// Like [`ResourceFetcher::new`], but cancelled whenever `token` is.
    ///
    /// Pass a child of the caller's own token to tie the fetcher to its lifetime.
    pub fn with_token(
        ctx: Arc<FeedContext>,
        entity: EntityId,
        period: Period,
        token: CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            ctx,
            key: R::cache_key(entity, period),
            state,
            cancel: token,
        }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn state(&self) -> FetchState<R::Data> {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<R::Data>> {
        self.state.subscribe()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn fetch(&self) -> FetchState<R::Data> {
        self.run(false).await
    }

    /// Fetches again even if the cache holds a valid entry.
    pub async fn refetch(&self) -> FetchState<R::Data> {
        self.run(true).await
    }

    async fn run(&self, force: bool) -> FetchState<R::Data> {
        if self.cancel.is_cancelled() {
            return self.state();
        }

        if !force {
            let hit = self
                .ctx
                .cache()
                .get_valid(&self.key)
                .and_then(|entry| decode::<R>(&entry).ok());
            if let Some((data, source)) = hit {
                debug!(key = %self.key, "cache hit");
                return self.settle(FetchState::ready(data, source));
            }
        }

        self.state.send_modify(|s| s.loading = true);

        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => {
                debug!(key = %self.key, "fetch cancelled, discarding its outcome");
                self.state.send_modify(|s| s.loading = false);
                return self.state();
            }
            outcome = self.ctx.resolve::<R>(&self.key) => outcome,
        };

        let next = match outcome.and_then(|entry| decode::<R>(&entry)) {
            Ok((data, source)) => FetchState::ready(data, source),
            Err(error) => FetchState::failed(error.to_string()),
        };
        self.settle(next)
    }

    fn settle(&self, next: FetchState<R::Data>) -> FetchState<R::Data> {
        self.state.send_replace(next.clone());
        next
    }
}

impl<R: Resource> Drop for ResourceFetcher<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn decode<R: Resource>(entry: &CacheEntry) -> Result<(Arc<R::Data>, SourceTag), FetchError> {
    entry
        .payload::<R::Data>()
        .map(|data| (data, entry.source))
        .ok_or_else(|| {
            FetchError::Upstream(format!("cached payload for {} has an unexpected type", entry.key))
        })
}
