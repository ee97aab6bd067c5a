//! Outbound Ports (Driven Ports / SPI)

use std::time::Duration;

use async_trait::async_trait;
use shared_types::{
    ContainerDetails, MetadataContainer, MetadataError, RuntimeContainerSummary, RuntimeError,
    SelfHost,
};

/// Container runtime operations the reaper needs.
///
/// Implementations must be safe to call from several passes at once.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// List containers. With `all = true` stopped containers are included and
    /// the result is ordered newest first.
    async fn list_containers(&self, all: bool)
        -> Result<Vec<RuntimeContainerSummary>, RuntimeError>;

    /// Resolve a container by id.
    async fn inspect_container(&self, id: &str) -> Result<ContainerDetails, RuntimeError>;

    /// Delete a container; `force` kills it first if running.
    async fn remove_container(&self, id: &str, force: bool) -> Result<(), RuntimeError>;

    /// Stop a container, killing it after `grace`.
    async fn stop_container(&self, id: &str, grace: Duration) -> Result<(), RuntimeError>;
}

/// Desired-state view served by the metadata service.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Identity of the host this agent runs on.
    async fn get_self_host(&self) -> Result<SelfHost, MetadataError>;

    /// Every container record known to the metadata service.
    async fn get_containers(&self) -> Result<Vec<MetadataContainer>, MetadataError>;

    /// Block until the metadata version differs from `current` or `max_wait`
    /// elapses, then return the version the service reports.
    async fn wait_for_version(
        &self,
        current: &str,
        max_wait: Duration,
    ) -> Result<String, MetadataError>;
}
