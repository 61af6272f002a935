//! Feed configuration: parsing, defaults, and validation.
//!
//! A [`FeedConfig`] can be loaded from a TOML document ([`FeedConfig::from_toml_str`],
//! [`FeedConfig::from_path`]) or from the process environment
//! ([`FeedConfig::from_env`]). Every field has a default, so a config file only
//! has to name what it overrides.
//!
//! Environment variables read by [`FeedConfig::from_env`]:
//! - `API_BASE_URL` (required)
//! - `SERIES_FEED_BUILD_MODE` (`production` | `development`)
//! - `SERIES_FEED_FALLBACK` (`always_mock` | `never_mock` | `mock_only_outside_prod`)
//! - `SERIES_FEED_MOCK_SEED` (u64)

use std::{num::NonZeroU32, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use shared_utils::env::{InvalidEnvVarError, MissingEnvVarError, get_env_var, parse_env_var};
use thiserror::Error;

/// Entries older than this are ignored by the cache.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
/// Upper bound on a single upstream call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CACHE_CAPACITY: usize = 256;
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingEnvVarError),

    #[error(transparent)]
    InvalidEnvVar(#[from] InvalidEnvVarError),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Whether this is a production build. Only consulted by
/// [`FallbackPolicy::MockOnlyOutsideProd`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    Production,
    Development,
}

impl Default for BuildMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            BuildMode::Development
        } else {
            BuildMode::Production
        }
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(BuildMode::Production),
            "development" | "dev" => Ok(BuildMode::Development),
            other => Err(format!("unknown build mode '{other}'")),
        }
    }
}

/// What to do when the live source fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Always substitute synthetic data.
    AlwaysMock,
    /// Always surface the error.
    NeverMock,
    /// Substitute synthetic data unless the build is a production build.
    #[default]
    MockOnlyOutsideProd,
}

impl FallbackPolicy {
    pub fn allows_mock(self, mode: BuildMode) -> bool {
        match self {
            FallbackPolicy::AlwaysMock => true,
            FallbackPolicy::NeverMock => false,
            FallbackPolicy::MockOnlyOutsideProd => mode != BuildMode::Production,
        }
    }
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "always_mock" | "always" => Ok(FallbackPolicy::AlwaysMock),
            "never_mock" | "never" => Ok(FallbackPolicy::NeverMock),
            "mock_only_outside_prod" => Ok(FallbackPolicy::MockOnlyOutsideProd),
            other => Err(format!("unknown fallback policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Base URL of the dashboard API, without a trailing slash.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    /// Maximum number of cached entries before eviction kicks in.
    pub cache_capacity: usize,
    /// Outbound request budget for the HTTP source.
    pub requests_per_second: u32,
    pub fallback_policy: FallbackPolicy,
    pub build_mode: BuildMode,
    /// Seeds the synthetic generator. Unseeded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            fallback_policy: FallbackPolicy::default(),
            build_mode: BuildMode::default(),
            mock_seed: None,
        }
    }
}

impl FeedConfig {
    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let mut cfg: FeedConfig = toml::from_str(toml_str)?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read a TOML config file from disk, parse, and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Read {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Build a config from the environment; see the module docs for the variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = FeedConfig {
            api_base_url: get_env_var("API_BASE_URL")?,
            ..Default::default()
        };
        if let Some(mode) = parse_env_var::<BuildMode>("SERIES_FEED_BUILD_MODE")? {
            cfg.build_mode = mode;
        }
        if let Some(policy) = parse_env_var::<FallbackPolicy>("SERIES_FEED_FALLBACK")? {
            cfg.fallback_policy = policy;
        }
        cfg.mock_seed = parse_env_var::<u64>("SERIES_FEED_MOCK_SEED")?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn rate_limit(&self) -> Result<NonZeroU32, ConfigError> {
        NonZeroU32::new(self.requests_per_second)
            .ok_or_else(|| ConfigError::Invalid("requests_per_second must be > 0".into()))
    }

    /// Whether a failed live fetch may be masked with synthetic data.
    pub fn allows_mock(&self) -> bool {
        self.fallback_policy.allows_mock(self.build_mode)
    }

    fn normalize(&mut self) {
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be > 0".into()));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid("cache_ttl_secs must be > 0".into()));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid("cache_capacity must be > 0".into()));
        }
        self.rate_limit()?;
        Ok(())
    }
}
