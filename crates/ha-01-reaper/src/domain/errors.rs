//! Error types for the Reaper

use shared_types::{MetadataError, RuntimeError};
use thiserror::Error;

/// All errors that can occur while reaping
#[derive(Debug, Error)]
pub enum ReaperError {
    /// Self host could not be fetched; the pass is aborted
    #[error("failed to fetch self host: {0}")]
    SelfHost(#[source] MetadataError),

    /// Metadata containers could not be fetched; the pass is aborted
    #[error("failed to fetch metadata containers: {0}")]
    MetadataContainers(#[source] MetadataError),

    /// Runtime listing failed; the dedup pass is aborted
    #[error("failed to list runtime containers: {0}")]
    ListContainers(#[source] RuntimeError),

    /// Inspect failed for one container
    #[error("inspect failed for {id}: {source}")]
    Inspect { id: String, source: RuntimeError },

    /// Remove failed for one container
    #[error("remove failed for {id}: {source}")]
    Remove { id: String, source: RuntimeError },

    /// Stop failed for one container
    #[error("stop failed for {id}: {source}")]
    Stop { id: String, source: RuntimeError },

    /// Invalid configuration
    #[error("invalid reaper configuration: {0}")]
    Config(String),
}

impl ReaperError {
    /// Errors that abort a whole pass rather than a single item.
    pub fn is_pass_level(&self) -> bool {
        matches!(
            self,
            Self::SelfHost(_) | Self::MetadataContainers(_) | Self::ListContainers(_)
        )
    }
}

/// Result type for reaper operations
pub type ReaperResult<T> = Result<T, ReaperError>;
