//! In-memory host.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;

use ha_01_reaper::{ContainerRuntime, MetadataSource};
use ha_02_event_dispatch::{ContainerLister, LifecycleEventSource, LifecycleEventStream};
use shared_types::{
    ContainerDetails, ContainerState, EventStatus, LifecycleEvent, MetadataContainer,
    MetadataError, RuntimeContainerSummary, RuntimeError, SelfHost,
};

type EventSender = mpsc::UnboundedSender<Result<LifecycleEvent, RuntimeError>>;

#[derive(Clone)]
struct HostContainer {
    id: String,
    name: String,
    image: String,
    running: bool,
    labels: HashMap<String, String>,
}

#[derive(Default)]
struct HostState {
    /// Newest first.
    containers: Vec<HostContainer>,
    metadata: Vec<MetadataContainer>,
    subscribers: Vec<EventSender>,
    stops: Vec<(String, Duration)>,
}

impl HostState {
    fn emit(&mut self, id: &str, status: EventStatus, image: &str) {
        let event = LifecycleEvent::live(id, status, image);
        self.subscribers
            .retain(|subscriber| subscriber.send(Ok(event.clone())).is_ok());
    }
}

/// One host: runtime + metadata view.
pub struct InMemoryHost {
    uuid: String,
    state: Mutex<HostState>,
    version: watch::Sender<u64>,
}

impl InMemoryHost {
    pub fn new(uuid: &str) -> Self {
        let (version, _) = watch::channel(1);
        Self {
            uuid: uuid.to_string(),
            state: Mutex::new(HostState::default()),
            version,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Start a new container (becomes the newest) and emit `start`.
    pub fn run(&self, id: &str, name: &str, labels: &[(&str, &str)]) {
        let mut state = self.state.lock();
        state.containers.insert(
            0,
            HostContainer {
                id: id.to_string(),
                name: name.to_string(),
                image: format!("{}:latest", name.trim_start_matches('/')),
                running: true,
                labels: labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
        );
        state.emit(id, EventStatus::Start, &format!("{}:latest", name.trim_start_matches('/')));
    }

    /// Add an exited container without emitting anything.
    pub fn add_exited(&self, id: &str, name: &str) {
        self.state.lock().containers.insert(
            0,
            HostContainer {
                id: id.to_string(),
                name: name.to_string(),
                image: "busybox:latest".to_string(),
                running: false,
                labels: HashMap::new(),
            },
        );
    }

    /// Publish a metadata record and bump the metadata version.
    pub fn schedule(&self, uuid: &str, external_id: &str, labels: &[(&str, &str)]) {
        self.state.lock().metadata.push(MetadataContainer {
            uuid: uuid.to_string(),
            external_id: external_id.to_string(),
            host_uuid: self.uuid.clone(),
            name: format!("container-{}", uuid),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self.version.send_modify(|version| *version += 1);
    }

    pub fn container_ids(&self) -> Vec<String> {
        self.state.lock().containers.iter().map(|c| c.id.clone()).collect()
    }

    pub fn running_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .containers
            .iter()
            .filter(|c| c.running)
            .map(|c| c.id.clone())
            .collect()
    }

    pub fn stops(&self) -> Vec<(String, Duration)> {
        self.state.lock().stops.clone()
    }

    fn listing(&self, all: bool) -> Vec<RuntimeContainerSummary> {
        self.state
            .lock()
            .containers
            .iter()
            .filter(|c| all || c.running)
            .map(|c| RuntimeContainerSummary {
                id: c.id.clone(),
                state: if c.running {
                    ContainerState::Running
                } else {
                    ContainerState::parse("exited")
                },
                labels: c.labels.clone(),
                name: c.name.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl ContainerRuntime for InMemoryHost {
    async fn list_containers(
        &self,
        all: bool,
    ) -> Result<Vec<RuntimeContainerSummary>, RuntimeError> {
        Ok(self.listing(all))
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerDetails, RuntimeError> {
        self.state
            .lock()
            .containers
            .iter()
            .find(|c| c.id == id)
            .map(|c| ContainerDetails {
                id: c.id.clone(),
                name: c.name.clone(),
            })
            .ok_or_else(|| RuntimeError::NotFound(id.to_string()))
    }

    async fn remove_container(&self, id: &str, force: bool) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        let Some(index) = state.containers.iter().position(|c| c.id == id) else {
            return Ok(());
        };
        let container = state.containers[index].clone();
        if container.running {
            if !force {
                return Err(RuntimeError::Request(format!("{} is running", id)));
            }
            state.emit(id, EventStatus::Die, &container.image);
        }
        state.containers.remove(index);
        state.emit(id, EventStatus::parse("destroy"), &container.image);
        Ok(())
    }

    async fn stop_container(&self, id: &str, grace: Duration) -> Result<(), RuntimeError> {
        let mut state = self.state.lock();
        state.stops.push((id.to_string(), grace));
        let Some(container) = state.containers.iter_mut().find(|c| c.id == id) else {
            return Err(RuntimeError::NotFound(id.to_string()));
        };
        if !container.running {
            return Ok(());
        }
        container.running = false;
        let image = container.image.clone();
        state.emit(id, EventStatus::Die, &image);
        Ok(())
    }
}

#[async_trait]
impl ContainerLister for InMemoryHost {
    async fn list_containers(
        &self,
        all: bool,
    ) -> Result<Vec<RuntimeContainerSummary>, RuntimeError> {
        Ok(self.listing(all))
    }
}

#[async_trait]
impl LifecycleEventSource for InMemoryHost {
    async fn subscribe(&self) -> Result<LifecycleEventStream, RuntimeError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().subscribers.push(tx);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

#[async_trait]
impl MetadataSource for InMemoryHost {
    async fn get_self_host(&self) -> Result<SelfHost, MetadataError> {
        Ok(SelfHost {
            uuid: self.uuid.clone(),
            name: format!("host-{}", self.uuid),
        })
    }

    async fn get_containers(&self) -> Result<Vec<MetadataContainer>, MetadataError> {
        Ok(self.state.lock().metadata.clone())
    }

    async fn wait_for_version(
        &self,
        current: &str,
        max_wait: Duration,
    ) -> Result<String, MetadataError> {
        let mut version = self.version.subscribe();
        let now = version.borrow_and_update().to_string();
        if now != current {
            return Ok(now);
        }
        let _ = tokio::time::timeout(max_wait, version.changed()).await;
        let latest = version.borrow().to_string();
        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_remove_emits_die_then_destroy() {
        let host = InMemoryHost::new("H");
        host.run("d1", "/web", &[]);
        let mut events = host.subscribe().await.unwrap();

        ContainerRuntime::remove_container(&host, "d1", true).await.unwrap();

        let die = events.next().await.unwrap().unwrap();
        let destroy = events.next().await.unwrap().unwrap();
        assert_eq!(die.status, EventStatus::Die);
        assert_eq!(destroy.status, EventStatus::parse("destroy"));
        assert!(host.container_ids().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let host = InMemoryHost::new("H");
        assert!(ContainerRuntime::remove_container(&host, "nope", true).await.is_ok());
    }

    #[tokio::test]
    async fn test_listing_newest_first() {
        let host = InMemoryHost::new("H");
        host.run("m1", "/m1", &[]);
        host.run("m2", "/m2", &[]);
        host.add_exited("x1", "/x1");

        assert_eq!(host.container_ids(), vec!["x1", "m2", "m1"]);
        assert_eq!(host.running_ids(), vec!["m2", "m1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_version_wait_wakes_on_schedule() {
        let host = std::sync::Arc::new(InMemoryHost::new("H"));
        assert_eq!(host.wait_for_version("init", Duration::from_secs(5)).await.unwrap(), "1");

        let waiter = {
            let host = std::sync::Arc::clone(&host);
            tokio::spawn(async move { host.wait_for_version("1", Duration::from_secs(5)).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        host.schedule("a1", "d1", &[]);

        assert_eq!(waiter.await.unwrap().unwrap(), "2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_version_wait_times_out_unchanged() {
        let host = InMemoryHost::new("H");
        let version = host.wait_for_version("1", Duration::from_secs(5)).await.unwrap();
        assert_eq!(version, "1");
    }
}
