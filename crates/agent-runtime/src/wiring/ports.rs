//! Port bundle handed to the runtime.

use std::sync::Arc;

use ha_01_reaper::{ContainerRuntime, MetadataSource};
use ha_02_event_dispatch::{ContainerLister, LifecycleEventSource};

use crate::adapters::{DockerRuntime, HttpMetadataClient};
use crate::container::AgentConfig;
use crate::error::AgentError;

/// Every outbound port both subsystems need.
#[derive(Clone)]
pub struct AgentPorts {
    pub runtime: Arc<dyn ContainerRuntime>,
    pub lister: Arc<dyn ContainerLister>,
    pub events: Arc<dyn LifecycleEventSource>,
    pub metadata: Arc<dyn MetadataSource>,
}

impl AgentPorts {
    /// Production adapters: one Docker client behind the three runtime ports
    /// and an HTTP metadata client.
    pub fn connect(config: &AgentConfig) -> Result<Self, AgentError> {
        let docker = Arc::new(DockerRuntime::connect(
            config.docker_host.as_deref(),
            config.request_timeout(),
        )?);
        let metadata = Arc::new(HttpMetadataClient::new(
            config.metadata_url.clone(),
            config.request_timeout(),
        )?);

        Ok(Self {
            runtime: docker.clone(),
            lister: docker.clone(),
            events: docker,
            metadata,
        })
    }
}
