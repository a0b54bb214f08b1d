//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::TrendWindow;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API and HTTP client settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Token validation timing
    #[serde(default)]
    pub session: SessionConfig,

    /// Trend query defaults
    #[serde(default)]
    pub trends: TrendsConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::validation("api.base_url is empty"));
        }
        Url::parse(&self.api.base_url)
            .map_err(|e| AppError::validation(format!("api.base_url is invalid: {e}")))?;
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.api.max_concurrent == 0 {
            return Err(AppError::validation("api.max_concurrent must be > 0"));
        }
        if self.session.grace_period_secs > self.session.validation_interval_secs {
            return Err(AppError::validation(
                "session.grace_period_secs must not exceed session.validation_interval_secs",
            ));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the tracking service
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Requests slower than this are logged as warnings
    #[serde(default = "defaults::slow_request")]
    pub slow_request_ms: u64,

    /// Maximum concurrent requests for bulk fetches
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn slow_request_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_request_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            slow_request_ms: defaults::slow_request(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Token validation timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Re-validate the access token once it is older than this
    #[serde(default = "defaults::validation_interval")]
    pub validation_interval_secs: u64,

    /// A token validated within this window is trusted through network errors
    #[serde(default = "defaults::grace_period")]
    pub grace_period_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            validation_interval_secs: defaults::validation_interval(),
            grace_period_secs: defaults::grace_period(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendsConfig {
    #[serde(default)]
    pub default_window: TrendWindow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of `debug`, `info`, `warn`, `error`
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Api defaults
    pub fn base_url() -> String {
        "http://localhost:8010".into()
    }
    pub fn user_agent() -> String {
        concat!("jobtrack/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn slow_request() -> u64 {
        5000
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Session defaults
    pub fn validation_interval() -> u64 {
        5 * 60
    }
    pub fn grace_period() -> u64 {
        2 * 60
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
