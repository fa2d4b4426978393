//! Harvest configuration: RON file first, then command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use harvester_core::HarvestConfig;

#[derive(Debug, Parser)]
#[command(
    name = "autocomplete-harvester",
    about = "Discover every entry an autocomplete API will suggest",
    version
)]
pub struct Cli {
    /// RON file with a `HarvestConfig`; flags below override its fields.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base endpoint; `{endpoint}/{version}/autocomplete` is queried.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// API version to harvest (repeatable, processed in the given order).
    #[arg(long = "api-version", value_name = "VERSION")]
    pub api_versions: Vec<String>,

    /// Base pause in seconds for retry backoff and sibling pacing.
    #[arg(long, value_name = "SECS")]
    pub pause: Option<f64>,

    /// Retries after the first attempt on HTTP 429.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Deepest traversal level that is still queried.
    #[arg(long)]
    pub depth_limit: Option<u32>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub request_timeout: Option<f64>,

    /// Harvest all API versions concurrently.
    #[arg(long)]
    pub concurrent_versions: bool,

    /// Output file for harvested entries.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: log::LevelFilter,

    /// Also write logs to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Resolves the final configuration and validates it.
    pub fn harvest_config(&self) -> Result<HarvestConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)?,
            None => HarvestConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate().context("invalid harvest configuration")?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut HarvestConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if !self.api_versions.is_empty() {
            config.api_versions = self.api_versions.clone();
        }
        if let Some(pause) = self.pause {
            config.base_pause_secs = pause;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        if let Some(depth_limit) = self.depth_limit {
            config.depth_limit = depth_limit;
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout_secs = timeout;
        }
        if self.concurrent_versions {
            config.concurrent_versions = true;
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
    }
}

pub fn load_config_file(path: &Path) -> Result<HarvestConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    ron::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}
