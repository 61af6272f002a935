//! The resource kinds served by the dashboard API and how each is synthesized
//! when the API is unavailable.
//!
//! A [`Resource`] ties a [`ResourceKind`] (the URL segment and cache-key part)
//! to its payload type. [`ExternalMetric`] resources are the ones developer
//! activity is correlated against; [`Correlation`] is generic over them.

use std::{fmt, marker::PhantomData, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    cache::CacheKey,
    correlation::{CorrelationEngine, MetricPair},
    models::{
        ActivityPoint, AirQualityPoint, CorrelationResult, EntityId, Period, PricePoint,
        SeriesPoint,
    },
    synthetic::SyntheticSeriesGenerator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Github,
    AirQuality,
    Crypto,
    Correlation,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Github,
        ResourceKind::AirQuality,
        ResourceKind::Crypto,
        ResourceKind::Correlation,
    ];

    /// Path segment in `/{resource}/{entity}/{period}`.
    pub const fn path_segment(self) -> &'static str {
        match self {
            ResourceKind::Github => "github",
            ResourceKind::AirQuality => "airquality",
            ResourceKind::Crypto => "crypto",
            ResourceKind::Correlation => "correlation",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.path_segment() == s)
            .ok_or_else(|| format!("unknown resource '{s}'"))
    }
}

pub trait Resource: Send + Sync + 'static {
    type Data: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    const KIND: ResourceKind;

    /// Where this resource's payload for `entity` and `period` is cached.
    fn cache_key(entity: EntityId, period: Period) -> CacheKey {
        CacheKey::new(Self::KIND, entity, period)
    }

    /// Whether a successfully decoded payload has no usable points.
    fn is_empty(data: &Self::Data) -> bool;

    /// Builds a stand-in payload covering `period` days ending at `end`.
    fn synthesize(
        entity: &EntityId,
        period: Period,
        end: NaiveDate,
        generator: &mut SyntheticSeriesGenerator,
    ) -> Self::Data;
}

/// A per-day series that developer activity is compared against.
pub trait ExternalMetric: Resource {
    type Point: SeriesPoint;

    /// Pairs computed by [`Correlation<Self>`].
    const PAIRS: &'static [MetricPair];

    fn points(data: &Self::Data) -> &[Self::Point];
}

/// GitHub commits/stars/forks per day.
#[derive(Debug)]
pub struct GithubActivity;

impl Resource for GithubActivity {
    type Data = Vec<ActivityPoint>;
    const KIND: ResourceKind = ResourceKind::Github;

    fn is_empty(data: &Self::Data) -> bool {
        data.is_empty()
    }

    fn synthesize(
        _entity: &EntityId,
        period: Period,
        end: NaiveDate,
        generator: &mut SyntheticSeriesGenerator,
    ) -> Self::Data {
        generator.activity(period, end)
    }
}

#[derive(Debug)]
pub struct AirQuality;

impl Resource for AirQuality {
    type Data = Vec<AirQualityPoint>;
    const KIND: ResourceKind = ResourceKind::AirQuality;

    fn is_empty(data: &Self::Data) -> bool {
        data.is_empty()
    }

    fn synthesize(
        entity: &EntityId,
        period: Period,
        end: NaiveDate,
        generator: &mut SyntheticSeriesGenerator,
    ) -> Self::Data {
        generator.air_quality(entity, period, end)
    }
}

impl ExternalMetric for AirQuality {
    type Point = AirQualityPoint;

    const PAIRS: &'static [MetricPair] = &[
        MetricPair::new("commits_aqi", "commits", "aqi"),
        MetricPair::new("commits_pm25", "commits", "pm25"),
        MetricPair::new("stars_aqi", "stars", "aqi"),
    ];

    fn points(data: &Self::Data) -> &[Self::Point] {
        data
    }
}

#[derive(Debug)]
pub struct CryptoPrice;

impl Resource for CryptoPrice {
    type Data = Vec<PricePoint>;
    const KIND: ResourceKind = ResourceKind::Crypto;

    fn is_empty(data: &Self::Data) -> bool {
        data.is_empty()
    }

    fn synthesize(
        entity: &EntityId,
        period: Period,
        end: NaiveDate,
        generator: &mut SyntheticSeriesGenerator,
    ) -> Self::Data {
        generator.prices(entity, period, end)
    }
}

impl ExternalMetric for CryptoPrice {
    type Point = PricePoint;

    const PAIRS: &'static [MetricPair] = &[
        MetricPair::new("commits_price", "commits", "price"),
        MetricPair::new("commits_volume", "commits", "volume"),
        MetricPair::new("stars_price", "stars", "price"),
    ];

    fn points(data: &Self::Data) -> &[Self::Point] {
        data
    }
}

/// Activity vs. `M` correlation, as served by `/correlation/{entity}/{period}`.
pub struct Correlation<M>(PhantomData<fn() -> M>);

impl<M: ExternalMetric> Resource for Correlation<M> {
    type Data = CorrelationResult;
    const KIND: ResourceKind = ResourceKind::Correlation;

    fn cache_key(entity: EntityId, period: Period) -> CacheKey {
        CacheKey::new(Self::KIND, entity, period).against(M::KIND)
    }

    fn is_empty(data: &Self::Data) -> bool {
        data.data_points == 0
    }

    /// Synthesizes both sides and runs the real analysis on them.
    fn synthesize(
        entity: &EntityId,
        period: Period,
        end: NaiveDate,
        generator: &mut SyntheticSeriesGenerator,
    ) -> Self::Data {
        let activity = GithubActivity::synthesize(entity, period, end, generator);
        let metric = M::synthesize(entity, period, end, generator);
        CorrelationEngine::analyze(entity, period, &activity, M::points(&metric), M::PAIRS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_path_segments() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.path_segment().parse::<ResourceKind>().unwrap(), kind);
        }
        assert!("weather".parse::<ResourceKind>().is_err());
        assert_eq!(
            serde_json::to_string(&ResourceKind::AirQuality).unwrap(),
            "\"airquality\""
        );
    }

    #[test]
    fn correlation_keys_are_scoped_by_metric() {
        let entity = EntityId::new("solana").unwrap();
        let city = Correlation::<AirQuality>::cache_key(entity.clone(), Period::Week);
        let coin = Correlation::<CryptoPrice>::cache_key(entity.clone(), Period::Week);
        assert_ne!(city, coin);
        assert_eq!(coin.kind, ResourceKind::Correlation);
        assert_eq!(GithubActivity::cache_key(entity, Period::Week).against, None);
    }

    #[test]
    fn synthetic_correlation_is_internally_consistent() {
        let end = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let entity = EntityId::new("bitcoin").unwrap();
        let mut generator = SyntheticSeriesGenerator::seeded(5);
        let result = Correlation::<CryptoPrice>::synthesize(&entity, Period::Month, end, &mut generator);

        assert_eq!(result.data_points, 30);
        assert_eq!(result.entity_id, entity);
        let names: Vec<&str> = result.correlations.keys().map(String::as_str).collect();
        assert_eq!(names, ["commits_price", "commits_volume", "stars_price"]);
        assert!(result.correlations.values().all(|r| (-1.0..=1.0).contains(r)));
        assert!((0.0..=1.0).contains(&result.confidence));
        assert_eq!(result.interpretation, result.strength().sentence());
        assert!(!Correlation::<CryptoPrice>::is_empty(&result));
    }

    #[test]
    fn city_correlation_uses_air_quality_pairs() {
        let end = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let entity = EntityId::new("delhi").unwrap();
        let mut generator = SyntheticSeriesGenerator::seeded(9);
        let result = Correlation::<AirQuality>::synthesize(&entity, Period::Week, end, &mut generator);
        assert!(result.correlations.contains_key("commits_aqi"));
        assert_eq!(result.data_points, 7);
    }
}
