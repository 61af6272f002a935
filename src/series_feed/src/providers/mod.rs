//! Source abstraction for the dashboard API.
//!
//! This module defines the [`SeriesSource`] trait, the seam between the fetch
//! layer and wherever payloads actually come from. [`http::HttpSource`] talks
//! to the real API; tests plug in in-process sources.
//!
//! Sources return the raw response envelope. Decoding `data` into a resource's
//! payload type, emptiness checks and fallbacks all happen in the fetch layer.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use serde_json::{Value, json};
//! use series_feed::errors::FetchError;
//! use series_feed::models::{ApiEnvelope, EntityId, Period};
//! use series_feed::providers::SeriesSource;
//! use series_feed::resources::ResourceKind;
//!
//! struct Offline;
//!
//! #[async_trait]
//! impl SeriesSource for Offline {
//!     async fn fetch(
//!         &self,
//!         _kind: ResourceKind,
//!         _entity: &EntityId,
//!         _period: Period,
//!     ) -> Result<ApiEnvelope<Value>, FetchError> {
//!         Err(FetchError::Network("offline".into()))
//!     }
//!
//!     async fn list_entities(&self) -> Result<ApiEnvelope<Value>, FetchError> {
//!         Ok(ApiEnvelope::ok(json!([])))
//!     }
//! }
//! ```

pub mod http;

use async_trait::async_trait;
use serde_json::Value;
use snafu::{Backtrace, Snafu};

use crate::{
    config::ConfigError,
    errors::FetchError,
    models::{ApiEnvelope, EntityId, Period},
    resources::ResourceKind,
};

pub use http::HttpSource;

/// Trait for fetching resource envelopes from the dashboard API.
///
/// Implementations must be usable behind `Arc<dyn SeriesSource>`; the fetch
/// layer applies the request timeout around every call.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// `GET /{kind}/{entity}/{period}`
    async fn fetch(
        &self,
        kind: ResourceKind,
        entity: &EntityId,
        period: Period,
    ) -> Result<ApiEnvelope<Value>, FetchError>;

    /// `GET /cities`
    async fn list_entities(&self) -> Result<ApiEnvelope<Value>, FetchError>;
}

/// Errors that can occur while constructing a source.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The feed configuration cannot drive a source.
    #[snafu(display("Invalid source configuration: {source}"))]
    InvalidConfig {
        source: ConfigError,
        backtrace: Backtrace,
    },
}
