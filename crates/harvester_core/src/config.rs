use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://35.200.185.69:8000/";
pub const DEFAULT_OUTPUT_FILENAME: &str = "harvested_entries.txt";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("endpoint is empty")]
    EmptyEndpoint,
    #[error("endpoint {endpoint:?} is not a valid url: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("endpoint scheme {0:?} is not http or https")]
    UnsupportedScheme(String),
    #[error("no api versions configured")]
    NoApiVersions,
    #[error("api version {0:?} is empty or contains '/'")]
    InvalidApiVersion(String),
    #[error("api version {0:?} is listed more than once")]
    DuplicateApiVersion(String),
    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration { field: &'static str, value: f64 },
    #[error("request timeout must be greater than zero")]
    ZeroRequestTimeout,
}

/// Immutable harvest configuration, supplied once at start-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Base endpoint; `{endpoint}/{api_version}/autocomplete` is queried.
    pub endpoint: String,
    /// API versions in processing and output order.
    pub api_versions: Vec<String>,
    /// Base pause used for retry backoff and sibling pacing.
    pub base_pause_secs: f64,
    /// Retries after the first attempt; `max_attempts + 1` requests at most.
    pub max_attempts: u32,
    /// Frames deeper than this are never queried.
    pub depth_limit: u32,
    pub request_timeout_secs: f64,
    pub connect_timeout_secs: f64,
    /// Harvest all versions at once instead of one after another.
    pub concurrent_versions: bool,
    pub output_path: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_versions: vec!["v1".to_string(), "v2".to_string(), "v3".to_string()],
            base_pause_secs: 2.0,
            max_attempts: 3,
            depth_limit: 2,
            request_timeout_secs: 30.0,
            connect_timeout_secs: 10.0,
            concurrent_versions: false,
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILENAME),
        }
    }
}

impl HarvestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.autocomplete_base()?;

        if self.api_versions.is_empty() {
            return Err(ConfigError::NoApiVersions);
        }
        let mut seen = HashSet::new();
        for version in &self.api_versions {
            if version.trim().is_empty() || version.contains('/') {
                return Err(ConfigError::InvalidApiVersion(version.clone()));
            }
            if !seen.insert(version.as_str()) {
                return Err(ConfigError::DuplicateApiVersion(version.clone()));
            }
        }

        check_seconds("base_pause_secs", self.base_pause_secs)?;
        check_seconds("request_timeout_secs", self.request_timeout_secs)?;
        check_seconds("connect_timeout_secs", self.connect_timeout_secs)?;
        if self.request_timeout_secs == 0.0 {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        Ok(())
    }

    pub fn base_pause(&self) -> Duration {
        seconds(self.base_pause_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        seconds(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        seconds(self.connect_timeout_secs)
    }

    /// Builds `{endpoint}/{api_version}/autocomplete` without a query string.
    ///
    /// A trailing slash on the endpoint is tolerated.
    pub fn autocomplete_url(&self, api_version: &str) -> Result<Url, ConfigError> {
        let base = self.autocomplete_base()?;
        let joined = format!(
            "{}/{}/autocomplete",
            base.as_str().trim_end_matches('/'),
            api_version
        );
        Url::parse(&joined).map_err(|err| ConfigError::InvalidEndpoint {
            endpoint: joined,
            reason: err.to_string(),
        })
    }

    fn autocomplete_base(&self) -> Result<Url, ConfigError> {
        let trimmed = self.endpoint.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        let url = Url::parse(trimmed).map_err(|err| ConfigError::InvalidEndpoint {
            endpoint: trimmed.to_string(),
            reason: err.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }
}

fn check_seconds(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { field, value })
    }
}

// Callers validate first; anything out of range collapses to zero.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
