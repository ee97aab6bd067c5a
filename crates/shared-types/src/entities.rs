//! # Container Entities
//!
//! Snapshots of the two views this agent reconciles:
//!
//! - **Desired state**: `MetadataContainer`, `SelfHost` (from the metadata service)
//! - **Actual state**: `RuntimeContainerSummary`, `ContainerDetails` (from the runtime)

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// DESIRED STATE (METADATA SERVICE)
// =============================================================================

/// Identity record of the host this agent runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SelfHost {
    /// Host UUID assigned by the orchestrator.
    pub uuid: String,
    /// Human readable host name.
    #[serde(default)]
    pub name: String,
}

/// A container record as the metadata service describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MetadataContainer {
    /// Orchestrator UUID of the container.
    pub uuid: String,
    /// Runtime identifier of the container backing this record.
    #[serde(default)]
    pub external_id: String,
    /// UUID of the host the container is scheduled on.
    #[serde(default)]
    pub host_uuid: String,
    /// Container name.
    #[serde(default)]
    pub name: String,
    /// Labels the orchestrator expects on the runtime object.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl MetadataContainer {
    /// Returns true when the record is scheduled on `host`.
    pub fn is_on_host(&self, host: &SelfHost) -> bool {
        self.host_uuid == host.uuid
    }

    /// Label value for `key`, if present.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

// =============================================================================
// ACTUAL STATE (CONTAINER RUNTIME)
// =============================================================================

/// Runtime state of a container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    /// The container process is running.
    Running,
    /// Any other state (created, exited, paused, dead, ...).
    Other(String),
}

impl ContainerState {
    /// Parse a runtime state string. Anything but `running` maps to `Other`.
    pub fn parse(state: &str) -> Self {
        if state.eq_ignore_ascii_case("running") {
            Self::Running
        } else {
            Self::Other(state.to_string())
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Other(state) => f.write_str(state),
        }
    }
}

/// One entry of a runtime container listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeContainerSummary {
    /// Runtime container identifier.
    pub id: String,
    /// Current state.
    pub state: ContainerState,
    /// Labels set on the runtime object.
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Primary container name (runtime form, e.g. `/web-1`).
    #[serde(default)]
    pub name: String,
}

impl RuntimeContainerSummary {
    /// Label value for `key`, if present.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Result of inspecting a single runtime container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContainerDetails {
    /// Runtime container identifier.
    pub id: String,
    /// Resolved container name (runtime form, e.g. `/rancher-agent`).
    pub name: String,
}
