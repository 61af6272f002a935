//! Composition of the fetchers one dashboard page needs for one entity.
//!
//! An [`Aggregate`] bundles the activity, external-metric and correlation
//! fetchers for an entity and period. It owns no state of its own: combined
//! `loading` and `errors` are read off the children, and [`Aggregate::load`]
//! simply drives all three concurrently. Children settle in whatever order
//! their requests complete.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::{
    fetcher::{FeedContext, FetchState, ResourceFetcher},
    models::{ActivityPoint, CorrelationResult, EntityId, Period},
    resources::{
        AirQuality, Correlation, CryptoPrice, ExternalMetric, GithubActivity, ResourceKind,
    },
};

/// Activity + air quality + correlation for a city.
pub type CityAggregate = Aggregate<AirQuality>;
/// Activity + price + correlation for a coin.
pub type CoinAggregate = Aggregate<CryptoPrice>;

pub struct Aggregate<M: ExternalMetric> {
    entity: EntityId,
    period: Period,
    pub activity: ResourceFetcher<GithubActivity>,
    pub metric: ResourceFetcher<M>,
    pub correlation: ResourceFetcher<Correlation<M>>,
    cancel: CancellationToken,
}

/// Point-in-time view of an [`Aggregate`].
#[derive(Debug, Serialize)]
#[serde(bound(serialize = "M: ExternalMetric"))]
pub struct AggregateState<M: ExternalMetric> {
    pub entity: EntityId,
    pub period: Period,
    pub activity: FetchState<Vec<ActivityPoint>>,
    pub metric: FetchState<M::Data>,
    pub correlation: FetchState<CorrelationResult>,
    pub loading: IndexMap<ResourceKind, bool>,
    /// Only resources whose latest attempt failed appear here.
    pub errors: IndexMap<ResourceKind, String>,
}

impl<M: ExternalMetric> AggregateState<M> {
    pub fn is_loading(&self) -> bool {
        self.loading.values().any(|l| *l)
    }
}

impl<M: ExternalMetric> Aggregate<M> {
    pub fn new(ctx: Arc<FeedContext>, entity: EntityId, period: Period) -> Self {
        let cancel = CancellationToken::new();
        Self {
            activity: ResourceFetcher::with_token(
                Arc::clone(&ctx),
                entity.clone(),
                period,
                cancel.child_token(),
            ),
            metric: ResourceFetcher::with_token(
                Arc::clone(&ctx),
                entity.clone(),
                period,
                cancel.child_token(),
            ),
            correlation: ResourceFetcher::with_token(
                ctx,
                entity.clone(),
                period,
                cancel.child_token(),
            ),
            entity,
            period,
            cancel,
        }
    }

    pub fn entity(&self) -> &EntityId {
        &self.entity
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// Fetches every child concurrently (cache hits return immediately).
    pub async fn load(&self) -> AggregateState<M> {
        tokio::join!(
            self.activity.fetch(),
            self.metric.fetch(),
            self.correlation.fetch()
        );
        self.snapshot()
    }

    /// One fresh attempt per child, bypassing the cache.
    pub async fn refetch_all(&self) -> AggregateState<M> {
        tokio::join!(
            self.activity.refetch(),
            self.metric.refetch(),
            self.correlation.refetch()
        );
        self.snapshot()
    }

    pub fn loading(&self) -> IndexMap<ResourceKind, bool> {
        IndexMap::from([
            (ResourceKind::Github, self.activity.is_loading()),
            (M::KIND, self.metric.is_loading()),
            (ResourceKind::Correlation, self.correlation.is_loading()),
        ])
    }

    /// True while at least one child is loading.
    pub fn is_loading(&self) -> bool {
        self.activity.is_loading() || self.metric.is_loading() || self.correlation.is_loading()
    }

    pub fn errors(&self) -> IndexMap<ResourceKind, String> {
        [
            (ResourceKind::Github, self.activity.error()),
            (M::KIND, self.metric.error()),
            (ResourceKind::Correlation, self.correlation.error()),
        ]
        .into_iter()
        .filter_map(|(kind, error)| error.map(|e| (kind, e)))
        .collect()
    }

    pub fn snapshot(&self) -> AggregateState<M> {
        AggregateState {
            entity: self.entity.clone(),
            period: self.period,
            activity: self.activity.state(),
            metric: self.metric.state(),
            correlation: self.correlation.state(),
            loading: self.loading(),
            errors: self.errors(),
        }
    }

    /// Cancels every child; pending fetches will not update their state.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}
