//! # Lifecycle Events
//!
//! Container lifecycle events as they flow from the runtime's event stream
//! (or the startup replay) into the handler pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Source marker carried by events manufactured at startup.
pub const SYNTHETIC_SOURCE: &str = "-simulated-";

/// Lifecycle status of an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Container started.
    Start,
    /// Container process exited.
    Die,
    /// Any other runtime action (create, destroy, kill, ...).
    Other(String),
}

impl EventStatus {
    /// Parse a runtime action string.
    pub fn parse(status: &str) -> Self {
        match status {
            "start" => Self::Start,
            "die" => Self::Die,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::Die => "die",
            Self::Other(status) => status,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an event came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSource {
    /// Emitted by the container runtime; carries the runtime's `from` field
    /// (usually the image name).
    Runtime(String),
    /// Manufactured by the startup replay.
    Synthetic,
}

impl EventSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Runtime(from) => from,
            Self::Synthetic => SYNTHETIC_SOURCE,
        }
    }
}

/// A container lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Runtime container identifier.
    pub id: String,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Origin of the event.
    pub source: EventSource,
}

impl LifecycleEvent {
    /// Event emitted by the runtime.
    pub fn live(id: impl Into<String>, status: EventStatus, from: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status,
            source: EventSource::Runtime(from.into()),
        }
    }

    /// Replay event for a container that already exists.
    pub fn synthetic(id: impl Into<String>, status: EventStatus) -> Self {
        Self {
            id: id.into(),
            status,
            source: EventSource::Synthetic,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == EventSource::Synthetic
    }
}
