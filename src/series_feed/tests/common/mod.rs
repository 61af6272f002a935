#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use series_feed::{
    BuildMode, FallbackPolicy, FeedConfig, FeedContext,
    errors::FetchError,
    models::{ActivityPoint, AirQualityPoint, ApiEnvelope, EntityId, Period, PricePoint},
    providers::SeriesSource,
    resources::ResourceKind,
};
use tokio::sync::Semaphore;

/// How the stub answers a request.
#[derive(Clone)]
pub enum Reply {
    /// A successful `live` envelope around the value.
    Live(Value),
    /// The envelope verbatim.
    Envelope(ApiEnvelope<Value>),
    Fail(FetchError),
    /// Never answers; only the request timeout ends the call.
    Hang,
    /// Answers like `Live` once the semaphore hands out a permit.
    Gated(Arc<Semaphore>, Value),
    /// Panics inside the source.
    Panic,
}

impl Reply {
    async fn answer(self) -> Result<ApiEnvelope<Value>, FetchError> {
        match self {
            Reply::Live(value) => Ok(ApiEnvelope::ok(value)),
            Reply::Envelope(envelope) => Ok(envelope),
            Reply::Fail(error) => Err(error),
            Reply::Hang => std::future::pending().await,
            Reply::Gated(gate, value) => {
                let _permit = gate.acquire().await.expect("gate closed");
                Ok(ApiEnvelope::ok(value))
            }
            Reply::Panic => panic!("source crashed"),
        }
    }
}

/// In-process [`SeriesSource`] with one canned reply per resource kind.
///
/// Kinds without a reply fail with a network error.
#[derive(Default)]
pub struct StubSource {
    replies: Mutex<HashMap<ResourceKind, Reply>>,
    cities: Mutex<Option<Reply>>,
    calls: Mutex<HashMap<ResourceKind, usize>>,
    city_calls: Mutex<usize>,
}

impl StubSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, kind: ResourceKind, reply: Reply) {
        self.replies.lock().unwrap().insert(kind, reply);
    }

    pub fn cities(&self, reply: Reply) {
        *self.cities.lock().unwrap() = Some(reply);
    }

    pub fn calls(&self, kind: ResourceKind) -> usize {
        self.calls.lock().unwrap().get(&kind).copied().unwrap_or(0)
    }

    pub fn city_calls(&self) -> usize {
        *self.city_calls.lock().unwrap()
    }
}

#[async_trait]
impl SeriesSource for StubSource {
    async fn fetch(
        &self,
        kind: ResourceKind,
        _entity: &EntityId,
        _period: Period,
    ) -> Result<ApiEnvelope<Value>, FetchError> {
        *self.calls.lock().unwrap().entry(kind).or_default() += 1;
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| Reply::Fail(FetchError::Network("connection refused".into())));
        reply.answer().await
    }

    async fn list_entities(&self) -> Result<ApiEnvelope<Value>, FetchError> {
        *self.city_calls.lock().unwrap() += 1;
        let reply = self
            .cities
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Reply::Fail(FetchError::Network("connection refused".into())));
        reply.answer().await
    }
}

pub fn config(policy: FallbackPolicy, mode: BuildMode) -> FeedConfig {
    FeedConfig {
        fallback_policy: policy,
        build_mode: mode,
        mock_seed: Some(7),
        ..Default::default()
    }
}

pub fn context(source: &Arc<StubSource>, mode: BuildMode) -> Arc<FeedContext> {
    context_with(source, FallbackPolicy::MockOnlyOutsideProd, mode)
}

pub fn context_with(
    source: &Arc<StubSource>,
    policy: FallbackPolicy,
    mode: BuildMode,
) -> Arc<FeedContext> {
    let source: Arc<dyn SeriesSource> = source.clone();
    FeedContext::new(config(policy, mode), source)
}

pub fn entity(raw: &str) -> EntityId {
    EntityId::new(raw).unwrap()
}

pub fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}

fn dates(days: usize) -> impl Iterator<Item = (usize, NaiveDate)> {
    let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
    (0..days).map(move |i| (i, end - Duration::days((days - 1 - i) as i64)))
}

/// Activity where commits and stars both climb day over day.
pub fn activity(days: usize) -> Vec<ActivityPoint> {
    dates(days)
        .map(|(i, date)| ActivityPoint {
            date,
            commits: 10 + i as u32,
            stars: 2 * i as u32,
            forks: 1,
        })
        .collect()
}

/// Air quality that worsens in step with [`activity`].
pub fn air_quality(days: usize) -> Vec<AirQualityPoint> {
    dates(days)
        .map(|(i, date)| AirQualityPoint {
            date,
            aqi: 50.0 + 3.0 * i as f64,
            pm25: 20.0 + i as f64,
            pm10: 40.0,
        })
        .collect()
}

pub fn prices(days: usize) -> Vec<PricePoint> {
    dates(days)
        .map(|(i, date)| PricePoint {
            date,
            price: 100.0 + i as f64,
            volume: 1.0e6 + 1.0e4 * i as f64,
            market_cap: 1.0e9,
        })
        .collect()
}
