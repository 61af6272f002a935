//! Client-side data acquisition and analysis for the developer-activity dashboard.
//!
//! The crate fetches per-entity time series (GitHub activity, air quality,
//! crypto prices) and their correlation from the dashboard API, caches them
//! with a time-to-live, substitutes synthetic series when the API is down and
//! the [`config::FallbackPolicy`] allows it, and computes Pearson correlations
//! between activity and an external metric.
//!
//! Start from a [`fetcher::FeedContext`], then ask it for a
//! [`fetcher::ResourceFetcher`] or an [`aggregate::Aggregate`].

pub mod aggregate;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod correlation;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod providers;
pub mod resources;
pub mod synthetic;

pub use aggregate::{Aggregate, AggregateState, CityAggregate, CoinAggregate};
pub use config::{BuildMode, FallbackPolicy, FeedConfig};
pub use errors::FetchError;
pub use fetcher::{FeedContext, FetchState, ResourceFetcher};
