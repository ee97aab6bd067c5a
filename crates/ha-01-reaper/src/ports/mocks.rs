//! In-memory fakes for the outbound ports
//!
//! Recording implementations used by unit tests, the scenario tests and the
//! workspace integration suite (`test-utils` feature).

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{
    ContainerDetails, ContainerState, MetadataContainer, MetadataError, RuntimeContainerSummary,
    RuntimeError, SelfHost,
};

use super::outbound::{ContainerRuntime, MetadataSource};

/// Build a runtime listing entry.
pub fn summary(id: &str, state: &str, labels: &[(&str, &str)]) -> RuntimeContainerSummary {
    RuntimeContainerSummary {
        id: id.to_string(),
        state: ContainerState::parse(state),
        labels: labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        name: format!("/{}", id),
    }
}

/// Build a metadata record.
pub fn metadata_container(
    uuid: &str,
    external_id: &str,
    host_uuid: &str,
    labels: &[(&str, &str)],
) -> MetadataContainer {
    MetadataContainer {
        uuid: uuid.to_string(),
        external_id: external_id.to_string(),
        host_uuid: host_uuid.to_string(),
        name: format!("container-{}", uuid),
        labels: labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

/// Recording container runtime.
#[derive(Default)]
pub struct MockRuntime {
    containers: Mutex<Vec<RuntimeContainerSummary>>,
    names: Mutex<HashMap<String, String>>,
    fail_list: AtomicBool,
    fail_inspect: Mutex<HashSet<String>>,
    fail_remove: Mutex<HashSet<String>>,
    fail_stop: Mutex<HashSet<String>>,
    inspected: Mutex<Vec<String>>,
    removals: Mutex<Vec<(String, bool)>>,
    stops: Mutex<Vec<(String, Duration)>>,
    list_calls: AtomicUsize,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listing entry (listings keep insertion order, newest first).
    pub fn with_container(self, container: RuntimeContainerSummary) -> Self {
        self.names
            .lock()
            .insert(container.id.clone(), container.name.clone());
        self.containers.lock().push(container);
        self
    }

    /// Name returned when `id` is inspected.
    pub fn with_name(self, id: &str, name: &str) -> Self {
        self.names.lock().insert(id.to_string(), name.to_string());
        self
    }

    pub fn failing_list(self) -> Self {
        self.fail_list.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_inspect(self, id: &str) -> Self {
        self.fail_inspect.lock().insert(id.to_string());
        self
    }

    pub fn failing_remove(self, id: &str) -> Self {
        self.fail_remove.lock().insert(id.to_string());
        self
    }

    pub fn failing_stop(self, id: &str) -> Self {
        self.fail_stop.lock().insert(id.to_string());
        self
    }

    pub fn inspected(&self) -> Vec<String> {
        self.inspected.lock().clone()
    }

    pub fn removals(&self) -> Vec<(String, bool)> {
        self.removals.lock().clone()
    }

    pub fn removed_ids(&self) -> Vec<String> {
        self.removals.lock().iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn stops(&self) -> Vec<(String, Duration)> {
        self.stops.lock().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn list_containers(
        &self,
        all: bool,
    ) -> Result<Vec<RuntimeContainerSummary>, RuntimeError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(RuntimeError::Unavailable("mock runtime down".to_string()));
        }
        let containers = self.containers.lock().clone();
        Ok(if all {
            containers
        } else {
            containers
                .into_iter()
                .filter(|c| c.state.is_running())
                .collect()
        })
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerDetails, RuntimeError> {
        self.inspected.lock().push(id.to_string());
        if self.fail_inspect.lock().contains(id) {
            return Err(RuntimeError::Request(format!("inspect {} refused", id)));
        }
        match self.names.lock().get(id) {
            Some(name) => Ok(ContainerDetails {
                id: id.to_string(),
                name: name.clone(),
            }),
            None => Err(RuntimeError::NotFound(id.to_string())),
        }
    }

    async fn remove_container(&self, id: &str, force: bool) -> Result<(), RuntimeError> {
        if self.fail_remove.lock().contains(id) {
            return Err(RuntimeError::Request(format!("remove {} refused", id)));
        }
        self.removals.lock().push((id.to_string(), force));
        Ok(())
    }

    async fn stop_container(&self, id: &str, grace: Duration) -> Result<(), RuntimeError> {
        if self.fail_stop.lock().contains(id) {
            return Err(RuntimeError::Request(format!("stop {} refused", id)));
        }
        self.stops.lock().push((id.to_string(), grace));
        Ok(())
    }
}

/// Scripted metadata service.
pub struct MockMetadata {
    host: Mutex<Result<SelfHost, MetadataError>>,
    containers: Mutex<Result<Vec<MetadataContainer>, MetadataError>>,
    versions: Mutex<VecDeque<Result<String, MetadataError>>>,
    containers_delay: Mutex<Option<Duration>>,
    self_host_calls: AtomicUsize,
    container_calls: AtomicUsize,
    version_waits: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockMetadata {
    pub fn new(host_uuid: &str) -> Self {
        Self {
            host: Mutex::new(Ok(SelfHost {
                uuid: host_uuid.to_string(),
                name: format!("host-{}", host_uuid),
            })),
            containers: Mutex::new(Ok(Vec::new())),
            versions: Mutex::new(VecDeque::new()),
            containers_delay: Mutex::new(None),
            self_host_calls: AtomicUsize::new(0),
            container_calls: AtomicUsize::new(0),
            version_waits: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_container(self, container: MetadataContainer) -> Self {
        if let Ok(containers) = self.containers.lock().as_mut() {
            containers.push(container);
        }
        self
    }

    pub fn failing_self_host(self) -> Self {
        *self.host.lock() = Err(MetadataError::Unavailable("mock metadata down".to_string()));
        self
    }

    pub fn failing_containers(self) -> Self {
        *self.containers.lock() = Err(MetadataError::Status {
            path: "/containers".to_string(),
            status: 500,
        });
        self
    }

    /// Versions returned by successive `wait_for_version` calls. Once the
    /// script runs out the mock behaves like an idle long poll.
    pub fn with_versions(self, versions: &[&str]) -> Self {
        self.versions
            .lock()
            .extend(versions.iter().map(|v| Ok(v.to_string())));
        self
    }

    pub fn with_version_error(self) -> Self {
        self.versions
            .lock()
            .push_back(Err(MetadataError::Unavailable("version wait failed".to_string())));
        self
    }

    /// Make every `get_containers` call take `delay`.
    pub fn with_containers_delay(self, delay: Duration) -> Self {
        *self.containers_delay.lock() = Some(delay);
        self
    }

    pub fn self_host_calls(&self) -> usize {
        self.self_host_calls.load(Ordering::SeqCst)
    }

    pub fn container_calls(&self) -> usize {
        self.container_calls.load(Ordering::SeqCst)
    }

    pub fn version_waits(&self) -> usize {
        self.version_waits.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for MockMetadata {
    async fn get_self_host(&self) -> Result<SelfHost, MetadataError> {
        self.self_host_calls.fetch_add(1, Ordering::SeqCst);
        self.host.lock().clone()
    }

    async fn get_containers(&self) -> Result<Vec<MetadataContainer>, MetadataError> {
        self.container_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.containers_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.containers.lock().clone()
    }

    async fn wait_for_version(
        &self,
        current: &str,
        max_wait: Duration,
    ) -> Result<String, MetadataError> {
        self.version_waits.fetch_add(1, Ordering::SeqCst);
        let next = self.versions.lock().pop_front();
        match next {
            Some(result) => result,
            None => {
                tokio::time::sleep(max_wait).await;
                Ok(current.to_string())
            }
        }
    }
}
