//! In-memory fakes for the outbound ports
//!
//! Recording handlers sharing one call log, and a scripted runtime whose live
//! stream is fed by the test (`test-utils` feature).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{ContainerState, LifecycleEvent, RuntimeContainerSummary, RuntimeError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::outbound::{ContainerLister, EventHandler, LifecycleEventSource, LifecycleEventStream};
use crate::domain::errors::HandlerError;

/// Ordered record of `(handler, event)` invocations, shared between handlers.
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<(String, LifecycleEvent)>>>,
}

impl CallLog {
    pub fn record(&self, handler: &str, event: &LifecycleEvent) {
        self.entries.lock().push((handler.to_string(), event.clone()));
    }

    pub fn entries(&self) -> Vec<(String, LifecycleEvent)> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Handler names that saw container `id`, in call order.
    pub fn handlers_for(&self, id: &str) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(_, event)| event.id == id)
            .map(|(handler, _)| handler.clone())
            .collect()
    }

    /// Events seen by `handler`, in call order.
    pub fn events_for(&self, handler: &str) -> Vec<LifecycleEvent> {
        self.entries
            .lock()
            .iter()
            .filter(|(name, _)| name == handler)
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Wait until at least `n` calls are recorded. False on timeout.
    pub async fn wait_for(&self, n: usize, timeout: Duration) -> bool {
        let poll = async {
            while self.len() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(timeout, poll).await.is_ok()
    }
}

/// Handler that appends every call to a `CallLog`.
pub struct RecordingHandler {
    name: String,
    log: CallLog,
    fail: bool,
    delay: Option<Duration>,
}

impl RecordingHandler {
    pub fn new(name: &str, log: CallLog) -> Self {
        Self {
            name: name.to_string(),
            log,
            fail: false,
            delay: None,
        }
    }

    /// Record, then return an error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Sleep before recording.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &LifecycleEvent) -> Result<(), HandlerError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.log.record(&self.name, event);
        if self.fail {
            return Err(HandlerError::failed(&self.name, "scripted failure"));
        }
        Ok(())
    }
}

/// Runtime fake: fixed container listing plus a live stream fed by the test.
pub struct MockEventRuntime {
    containers: Vec<RuntimeContainerSummary>,
    fail_list: bool,
    fail_subscribe: bool,
    live_tx: Mutex<Option<mpsc::UnboundedSender<Result<LifecycleEvent, RuntimeError>>>>,
    live_rx: Mutex<Option<mpsc::UnboundedReceiver<Result<LifecycleEvent, RuntimeError>>>>,
    calls: Mutex<Vec<&'static str>>,
    subscribed: AtomicBool,
}

impl Default for MockEventRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEventRuntime {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            containers: Vec::new(),
            fail_list: false,
            fail_subscribe: false,
            live_tx: Mutex::new(Some(tx)),
            live_rx: Mutex::new(Some(rx)),
            calls: Mutex::new(Vec::new()),
            subscribed: AtomicBool::new(false),
        }
    }

    /// Add a container to the listing (listing order is insertion order).
    pub fn with_container(mut self, id: &str, state: &str) -> Self {
        self.containers.push(RuntimeContainerSummary {
            id: id.to_string(),
            state: ContainerState::parse(state),
            labels: Default::default(),
            name: format!("/{}", id),
        });
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_subscribe(mut self) -> Self {
        self.fail_subscribe = true;
        self
    }

    /// Emit a live event.
    pub fn push_live(&self, event: LifecycleEvent) {
        if let Some(tx) = self.live_tx.lock().as_ref() {
            let _ = tx.send(Ok(event));
        }
    }

    /// Emit a stream error item.
    pub fn push_error(&self, error: RuntimeError) {
        if let Some(tx) = self.live_tx.lock().as_ref() {
            let _ = tx.send(Err(error));
        }
    }

    /// Close the live stream.
    pub fn end_stream(&self) {
        self.live_tx.lock().take();
    }

    /// `"subscribe"` / `"list"` in the order they were called.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerLister for MockEventRuntime {
    async fn list_containers(
        &self,
        all: bool,
    ) -> Result<Vec<RuntimeContainerSummary>, RuntimeError> {
        self.calls.lock().push("list");
        if self.fail_list {
            return Err(RuntimeError::Unavailable("mock runtime down".to_string()));
        }
        Ok(self
            .containers
            .iter()
            .filter(|c| all || c.state.is_running())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LifecycleEventSource for MockEventRuntime {
    async fn subscribe(&self) -> Result<LifecycleEventStream, RuntimeError> {
        self.calls.lock().push("subscribe");
        if self.fail_subscribe {
            return Err(RuntimeError::EventStream("subscribe refused".to_string()));
        }
        let rx = self
            .live_rx
            .lock()
            .take()
            .ok_or_else(|| RuntimeError::EventStream("already subscribed".to_string()))?;
        self.subscribed.store(true, Ordering::SeqCst);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}
