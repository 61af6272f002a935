use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde_json::Value;
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::{
    config::FeedConfig,
    errors::FetchError,
    models::{ApiEnvelope, EntityId, Period},
    providers::{ClientBuildSnafu, InvalidConfigSnafu, ProviderInitError, SeriesSource},
    resources::ResourceKind,
};

/// [`SeriesSource`] backed by the dashboard's HTTP API.
pub struct HttpSource {
    client: Client,
    base_url: String,
    limiter: DefaultDirectRateLimiter,
}

impl HttpSource {
    /// Creates a source for `config.api_base_url`.
    ///
    /// The reqwest client carries the configured request timeout, and outbound
    /// calls are throttled to `config.requests_per_second`.
    pub fn new(config: &FeedConfig) -> Result<Self, ProviderInitError> {
        config.validate().context(InvalidConfigSnafu)?;
        let rate = config.rate_limit().context(InvalidConfigSnafu)?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::direct(Quota::per_second(rate)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resource_url(&self, kind: ResourceKind, entity: &EntityId, period: Period) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            kind.path_segment(),
            entity,
            period
        )
    }

    pub fn cities_url(&self) -> String {
        format!("{}/cities", self.base_url)
    }

    /// GETs `url` and decodes the envelope, whatever the HTTP status.
    ///
    /// A non-success status is only reported when the body is not an envelope.
    async fn get_envelope(&self, url: &str) -> Result<ApiEnvelope<Value>, FetchError> {
        self.limiter.until_ready().await;
        debug!(url, "requesting");

        let response = self.client.get(url).send().await.inspect_err(|e| {
            warn!(url, error = %e, "request failed");
        })?;
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<ApiEnvelope<Value>>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => {
                Err(FetchError::Upstream(format!("HTTP {status} from {url}")))
            }
            Err(e) => Err(FetchError::Upstream(format!(
                "malformed response envelope from {url}: {e}"
            ))),
        }
    }
}

#[async_trait]
impl SeriesSource for HttpSource {
    async fn fetch(
        &self,
        kind: ResourceKind,
        entity: &EntityId,
        period: Period,
    ) -> Result<ApiEnvelope<Value>, FetchError> {
        let url = self.resource_url(kind, entity, period);
        self.get_envelope(&url).await
    }

    async fn list_entities(&self) -> Result<ApiEnvelope<Value>, FetchError> {
        let url = self.cities_url();
        self.get_envelope(&url).await
    }
}
