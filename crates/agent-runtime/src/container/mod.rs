//! # Agent Configuration
//!
//! Command-line flags, each also readable from an `HA_*` environment variable.

pub mod config;

pub use config::{AgentConfig, ConfigError, DEFAULT_METADATA_URL};
