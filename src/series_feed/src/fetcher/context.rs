use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use futures::FutureExt;
use tracing::{info, warn};

use crate::{
    aggregate::Aggregate,
    cache::{CacheEntry, CacheKey, CacheStore},
    config::FeedConfig,
    errors::FetchError,
    fetcher::{ResourceFetcher, inflight::Inflight},
    models::{ApiEnvelope, Entity, EntityId, Period, SourceTag},
    providers::{HttpSource, ProviderInitError, SeriesSource},
    resources::{ExternalMetric, Resource},
    synthetic::SyntheticSeriesGenerator,
};

/// Everything the fetchers of one application share: configuration, the
/// cache, the live source, the synthetic generator and the in-flight table.
///
/// Build one at startup and hand out `Arc` clones. Tests build their own, so
/// no state leaks between them.
pub struct FeedContext {
    config: FeedConfig,
    cache: CacheStore,
    source: Arc<dyn SeriesSource>,
    generator: Mutex<SyntheticSeriesGenerator>,
    inflight: Inflight,
}

impl FeedContext {
    pub fn new(config: FeedConfig, source: Arc<dyn SeriesSource>) -> Arc<Self> {
        Arc::new(Self {
            cache: CacheStore::new(config.cache_ttl(), config.cache_capacity),
            generator: Mutex::new(SyntheticSeriesGenerator::new(config.mock_seed)),
            inflight: Inflight::default(),
            source,
            config,
        })
    }

    /// A context talking to the HTTP API at `config.api_base_url`.
    pub fn connect(config: FeedConfig) -> Result<Arc<Self>, ProviderInitError> {
        let source = HttpSource::new(&config)?;
        Ok(Self::new(config, Arc::new(source)))
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Number of distinct keys currently being fetched.
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }

    pub fn fetcher<R: Resource>(
        self: &Arc<Self>,
        entity: EntityId,
        period: Period,
    ) -> ResourceFetcher<R> {
        ResourceFetcher::new(Arc::clone(self), entity, period)
    }

    pub fn aggregate<M: ExternalMetric>(
        self: &Arc<Self>,
        entity: EntityId,
        period: Period,
    ) -> Aggregate<M> {
        Aggregate::new(Arc::clone(self), entity, period)
    }

    /// The `/cities` listing. Not cached and never substituted with mock data.
    pub async fn cities(&self) -> Result<Vec<Entity>, FetchError> {
        let envelope = self.with_timeout(self.source.list_entities()).await?;
        let data = envelope.into_result().map_err(FetchError::Upstream)?;
        let cities: Vec<Entity> = serde_json::from_value(data)?;
        if cities.is_empty() {
            return Err(FetchError::EmptyDataset("cities".to_string()));
        }
        Ok(cities)
    }

    /// Fetches `key` from the live source, falling back per policy, and caches
    /// the result. Concurrent calls for the same key share one attempt.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) async fn resolve<R: Resource>(
        self: &Arc<Self>,
        key: &CacheKey,
    ) -> Result<Arc<CacheEntry>, FetchError> {
        let ctx = Arc::clone(self);
        let owned = key.clone();
        let pending = self.inflight.join_or_start(key, move || {
            // Runs to completion even if every waiter goes away, so the
            // result still lands in the cache.
            let task = tokio::spawn(async move {
                // Released on unwind too, so a panicking source cannot pin the key.
                let _pending = ctx.inflight.release_on_drop(&owned);
                ctx.acquire::<R>(&owned).await
            });
            async move {
                task.await.unwrap_or_else(|e| {
                    if e.is_cancelled() {
                        Err(FetchError::Cancelled)
                    } else {
                        Err(FetchError::Upstream(format!("fetch task panicked: {e}")))
                    }
                })
            }
            .boxed()
        });
        pending.await
    }

    async fn acquire<R: Resource>(&self, key: &CacheKey) -> Result<Arc<CacheEntry>, FetchError> {
        match self.fetch_live::<R>(key).await {
            Ok((data, source)) => {
                info!(key = %key, %source, "fetched");
                Ok(self.cache.set(key.clone(), Arc::new(data), source))
            }
            Err(error) if self.config.allows_mock() => {
                warn!(key = %key, %error, "live fetch failed, using synthetic data");
                let data = self.synthesize::<R>(key);
                Ok(self
                    .cache
                    .set(key.clone(), Arc::new(data), SourceTag::Mock))
            }
            Err(error) => {
                warn!(key = %key, %error, "live fetch failed");
                Err(error)
            }
        }
    }

    async fn fetch_live<R: Resource>(
        &self,
        key: &CacheKey,
    ) -> Result<(R::Data, SourceTag), FetchError> {
        let envelope = self
            .with_timeout(self.source.fetch(R::KIND, &key.entity, key.period))
            .await?;
        let source = envelope.source;
        let raw = envelope.into_result().map_err(FetchError::Upstream)?;
        let data: R::Data = serde_json::from_value(raw)?;
        if R::is_empty(&data) {
            return Err(FetchError::EmptyDataset(key.to_string()));
        }
        Ok((data, source))
    }

    fn synthesize<R: Resource>(&self, key: &CacheKey) -> R::Data {
        let today = Utc::now().date_naive();
        let mut generator = self.generator.lock().unwrap_or_else(PoisonError::into_inner);
        R::synthesize(&key.entity, key.period, today, &mut generator)
    }

    async fn with_timeout<F>(&self, call: F) -> Result<ApiEnvelope<serde_json::Value>, FetchError>
    where
        F: Future<Output = Result<ApiEnvelope<serde_json::Value>, FetchError>>,
    {
        let limit = self.config.request_timeout();
        tokio::time::timeout(limit, call).await.map_err(|_| {
            FetchError::Network(format!("request timed out after {}s", limit.as_secs()))
        })?
    }
}
