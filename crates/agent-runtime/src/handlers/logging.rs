//! Logging handler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use ha_02_event_dispatch::{EventHandler, HandlerError, HandlerRegistry};
use shared_types::LifecycleEvent;

/// Logs each event it receives.
pub struct TracingHandler {
    name: String,
    handled: AtomicU64,
}

impl TracingHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handled: AtomicU64::new(0),
        }
    }

    /// Registry with a logging handler in every slot.
    pub fn registry() -> HandlerRegistry {
        HandlerRegistry {
            binexec_watcher: Arc::new(Self::new("binexec-watcher")),
            start_handler: Arc::new(Self::new("start-handler")),
            network_manager: Arc::new(Self::new("network-manager")),
        }
    }

    pub fn handled(&self) -> u64 {
        self.handled.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EventHandler for TracingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &LifecycleEvent) -> Result<(), HandlerError> {
        self.handled.fetch_add(1, Ordering::Relaxed);
        info!(
            handler = %self.name,
            container_id = %event.id,
            status = %event.status,
            source = event.source.as_str(),
            "events: Lifecycle event"
        );
        Ok(())
    }
}
