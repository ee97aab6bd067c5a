//! # Docker Runtime Adapter
//!
//! One bollard client serves both subsystems. Listing returns containers
//! newest first, which the duplicate guard relies on.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bollard::container::{
    InspectContainerOptions, ListContainersOptions, RemoveContainerOptions, StopContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::models::{ContainerSummary, EventMessage, EventMessageTypeEnum};
use bollard::system::EventsOptions;
use bollard::{Docker, API_DEFAULT_VERSION};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use ha_01_reaper::ContainerRuntime;
use ha_02_event_dispatch::{ContainerLister, LifecycleEventSource, LifecycleEventStream};
use shared_types::{
    ContainerDetails, ContainerState, EventStatus, LifecycleEvent, RuntimeContainerSummary,
    RuntimeError,
};

/// Buffer between the Docker event stream and the router's forwarder.
const EVENT_BUFFER: usize = 64;

/// Docker Engine API client.
#[derive(Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect to `endpoint` (`unix://...`, `tcp://...`, `http://...`) or to
    /// the local defaults (`DOCKER_HOST`, then the default socket).
    pub fn connect(endpoint: Option<&str>, timeout: Duration) -> Result<Self, RuntimeError> {
        let timeout_secs = timeout.as_secs().max(1);
        let docker = match endpoint {
            None => Docker::connect_with_local_defaults(),
            Some(addr) if addr.starts_with("unix://") => {
                Docker::connect_with_unix(addr, timeout_secs, API_DEFAULT_VERSION)
            }
            Some(addr) => Docker::connect_with_http(addr, timeout_secs, API_DEFAULT_VERSION),
        }
        .map_err(|e| RuntimeError::Unavailable(e.to_string()))?;

        Ok(Self { docker })
    }

    async fn list(&self, all: bool) -> Result<Vec<RuntimeContainerSummary>, RuntimeError> {
        let options = ListContainersOptions::<String> {
            all,
            ..Default::default()
        };
        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| RuntimeError::Unavailable(e.to_string()))?;

        Ok(containers.into_iter().filter_map(to_summary).collect())
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_containers(
        &self,
        all: bool,
    ) -> Result<Vec<RuntimeContainerSummary>, RuntimeError> {
        self.list(all).await
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerDetails, RuntimeError> {
        let inspected = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| request_error(id, e))?;

        Ok(ContainerDetails {
            id: inspected.id.unwrap_or_else(|| id.to_string()),
            name: inspected.name.unwrap_or_default(),
        })
    }

    async fn remove_container(&self, id: &str, force: bool) -> Result<(), RuntimeError> {
        let options = RemoveContainerOptions {
            force,
            ..Default::default()
        };
        match self.docker.remove_container(id, Some(options)).await {
            Ok(()) => Ok(()),
            // Removed by an overlapping pass.
            Err(BollardError::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                debug!(container_id = id, "reaper: Container already removed");
                Ok(())
            }
            Err(e) => Err(request_error(id, e)),
        }
    }

    async fn stop_container(&self, id: &str, grace: Duration) -> Result<(), RuntimeError> {
        let options = StopContainerOptions {
            t: grace.as_secs() as i64,
        };
        self.docker
            .stop_container(id, Some(options))
            .await
            .map_err(|e| request_error(id, e))
    }
}

#[async_trait]
impl ContainerLister for DockerRuntime {
    async fn list_containers(
        &self,
        all: bool,
    ) -> Result<Vec<RuntimeContainerSummary>, RuntimeError> {
        self.list(all).await
    }
}

#[async_trait]
impl LifecycleEventSource for DockerRuntime {
    async fn subscribe(&self) -> Result<LifecycleEventStream, RuntimeError> {
        let docker = self.docker.clone();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let mut filters = HashMap::new();
        filters.insert("type".to_string(), vec!["container".to_string()]);
        let options = EventsOptions::<String> {
            filters,
            ..Default::default()
        };

        tokio::spawn(async move {
            let events = Box::pin(docker.events(Some(options)));
            pump_events(events, tx).await;
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// Map Docker events onto `tx` until either side goes away.
async fn pump_events<S>(mut events: S, tx: mpsc::Sender<Result<LifecycleEvent, RuntimeError>>)
where
    S: Stream<Item = Result<EventMessage, BollardError>> + Unpin,
{
    loop {
        let item = tokio::select! {
            item = events.next() => match item {
                Some(item) => item,
                None => {
                    warn!("events: Docker event stream closed");
                    break;
                }
            },
            // Router gone; do not wait for the next Docker event.
            _ = tx.closed() => break,
        };
        let mapped = match item {
            Ok(message) => match to_event(message) {
                Some(event) => Ok(event),
                None => continue,
            },
            Err(e) => Err(RuntimeError::EventStream(e.to_string())),
        };
        if tx.send(mapped).await.is_err() {
            break;
        }
    }
    debug!("events: Docker event pump stopped");
}

fn request_error(id: &str, error: BollardError) -> RuntimeError {
    match error {
        BollardError::DockerResponseServerError {
            status_code: 404, ..
        } => RuntimeError::NotFound(id.to_string()),
        e => RuntimeError::Request(e.to_string()),
    }
}

/// Listing entry → summary. Entries without an id are dropped.
fn to_summary(container: ContainerSummary) -> Option<RuntimeContainerSummary> {
    let id = container.id?;
    Some(RuntimeContainerSummary {
        id,
        state: ContainerState::parse(container.state.as_deref().unwrap_or_default()),
        labels: container.labels.unwrap_or_default(),
        name: container
            .names
            .and_then(|names| names.into_iter().next())
            .unwrap_or_default(),
    })
}

/// Engine event → lifecycle event. Non-container events and events without
/// an actor id are dropped. Actions such as `exec_start: sh -c ...` keep only
/// the part before the colon.
fn to_event(message: EventMessage) -> Option<LifecycleEvent> {
    if message.typ != Some(EventMessageTypeEnum::CONTAINER) {
        return None;
    }
    let action = message.action?;
    let actor = message.actor?;
    let id = actor.id?;
    let from = actor
        .attributes
        .as_ref()
        .and_then(|attributes| attributes.get("image"))
        .cloned()
        .unwrap_or_default();
    let status = action.split(':').next().unwrap_or_default().trim();

    Some(LifecycleEvent::live(id, EventStatus::parse(status), from))
}
