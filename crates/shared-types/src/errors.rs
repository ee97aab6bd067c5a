//! # Error Types
//!
//! Errors reported by the external collaborators (container runtime and
//! metadata service) through their adapters.

use thiserror::Error;

/// Errors returned by a container runtime adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuntimeError {
    /// The runtime could not be reached.
    #[error("runtime unavailable: {0}")]
    Unavailable(String),

    /// No container with this identifier.
    #[error("container not found: {0}")]
    NotFound(String),

    /// The runtime rejected the request.
    #[error("runtime request failed: {0}")]
    Request(String),

    /// The live event stream could not be opened or broke.
    #[error("event stream error: {0}")]
    EventStream(String),
}

/// Errors returned by a metadata service adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    /// The metadata service could not be reached.
    #[error("metadata service unavailable: {0}")]
    Unavailable(String),

    /// Non-success HTTP status or equivalent.
    #[error("metadata request {path} failed with status {status}")]
    Status { path: String, status: u16 },

    /// Response body could not be decoded.
    #[error("failed to decode metadata response: {0}")]
    Decode(String),
}
