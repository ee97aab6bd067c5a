//! Error types for the Event Dispatch Subsystem

use shared_types::RuntimeError;
use thiserror::Error;

/// Startup and routing errors.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Listener buffer or worker pool sized zero.
    #[error("pool size must be at least 1, got {0}")]
    InvalidPoolSize(usize),

    /// The runtime's live event stream could not be opened.
    #[error("failed to subscribe to runtime events: {0}")]
    Subscribe(#[source] RuntimeError),

    /// Listing existing containers for the replay failed.
    #[error("failed to list containers for replay: {0}")]
    ListContainers(#[source] RuntimeError),

    /// The router stopped accepting events.
    #[error("event router is closed")]
    RouterClosed,
}

/// Failure reported by one handler for one event.
///
/// Logged by the router; never stops the rest of the chain.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{handler}: {reason}")]
    Failed { handler: String, reason: String },
}

impl HandlerError {
    pub fn failed(handler: &str, reason: impl Into<String>) -> Self {
        Self::Failed {
            handler: handler.to_string(),
            reason: reason.into(),
        }
    }
}
