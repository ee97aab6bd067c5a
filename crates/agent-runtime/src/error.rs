//! Runtime-level errors.

use ha_01_reaper::ReaperError;
use ha_02_event_dispatch::DispatchError;
use shared_types::{MetadataError, RuntimeError};
use thiserror::Error;

use crate::container::ConfigError;

/// Errors that abort agent startup.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error("container runtime: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("metadata service: {0}")]
    Metadata(#[from] MetadataError),

    #[error("reaper: {0}")]
    Reaper(#[from] ReaperError),

    #[error("event dispatch: {0}")]
    Dispatch(#[from] DispatchError),
}
