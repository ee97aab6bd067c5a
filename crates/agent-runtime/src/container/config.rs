//! # Agent Configuration
//!
//! One flat set of flags covering the adapters, the subsystems and logging.
//! Reaper constants (labels, singleton services, poll schedule) are not
//! exposed; they keep their `ReaperConfig` defaults.

use std::time::Duration;

use clap::Parser;
use ha_01_reaper::ReaperConfig;
use ha_02_event_dispatch::DispatchConfig;
use thiserror::Error;

/// Default metadata service endpoint.
pub const DEFAULT_METADATA_URL: &str = "http://rancher-metadata/2015-12-19";

/// Host agent configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "host-agent")]
#[command(about = "Keeps host containers in line with cluster metadata and dispatches lifecycle events")]
pub struct AgentConfig {
    /// Docker endpoint (unix:///path or tcp://host:port); local defaults when unset
    #[arg(long, env = "HA_DOCKER_HOST")]
    pub docker_host: Option<String>,

    /// Metadata service base URL
    #[arg(long, env = "HA_METADATA_URL", default_value = DEFAULT_METADATA_URL)]
    pub metadata_url: String,

    /// Per-request timeout for metadata and runtime calls, in seconds
    #[arg(long, env = "HA_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Event listener buffer and worker pool size
    #[arg(long, env = "HA_POOL_SIZE", default_value_t = 10)]
    pub pool_size: usize,

    /// Log level or filter directive (RUST_LOG overrides)
    #[arg(long, env = "HA_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "HA_JSON_LOGS")]
    pub json_logs: bool,

    /// Do not run the orphan reaper or the duplicate guard
    #[arg(long, env = "HA_DISABLE_REAPER")]
    pub disable_reaper: bool,

    /// Do not start the event router
    #[arg(long, env = "HA_DISABLE_EVENTS")]
    pub disable_events: bool,

    /// How long shutdown waits for loops and handlers, in seconds
    #[arg(long, env = "HA_DRAIN_TIMEOUT_SECS", default_value_t = 10)]
    pub drain_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            docker_host: None,
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            request_timeout_secs: 10,
            pool_size: 10,
            log_level: "info".to_string(),
            json_logs: false,
            disable_reaper: false,
            disable_events: false,
            drain_timeout_secs: 10,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("pool size must be at least 1")]
    ZeroPoolSize,

    #[error("metadata URL must not be empty")]
    EmptyMetadataUrl,

    #[error("metadata URL must start with http:// or https://, got {0}")]
    InvalidMetadataUrl(String),

    #[error("request timeout must be at least 1 second")]
    ZeroRequestTimeout,
}

impl AgentConfig {
    /// Check everything that would otherwise fail later at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::ZeroPoolSize);
        }
        let url = self.metadata_url.trim();
        if url.is_empty() {
            return Err(ConfigError::EmptyMetadataUrl);
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidMetadataUrl(url.to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }

    pub fn reaper_config(&self) -> ReaperConfig {
        ReaperConfig::default()
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            pool_size: self.pool_size,
            ..Default::default()
        }
    }
}
