//! Outbound Ports (Driven Ports / SPI)

use std::pin::Pin;

use async_trait::async_trait;
use shared_types::{LifecycleEvent, RuntimeContainerSummary, RuntimeError};
use tokio_stream::Stream;

use crate::domain::errors::HandlerError;

/// Live lifecycle events from the runtime. An `Err` item is a recoverable
/// decode or transport hiccup; the stream ending means the runtime closed it.
pub type LifecycleEventStream =
    Pin<Box<dyn Stream<Item = Result<LifecycleEvent, RuntimeError>> + Send>>;

/// A consumer of lifecycle events.
///
/// One handler instance may be invoked for different events concurrently.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn handle(&self, event: &LifecycleEvent) -> Result<(), HandlerError>;
}

/// Enumerates containers for the startup replay.
#[async_trait]
pub trait ContainerLister: Send + Sync {
    /// With `all = true` stopped containers are included.
    async fn list_containers(&self, all: bool)
        -> Result<Vec<RuntimeContainerSummary>, RuntimeError>;
}

/// Opens the runtime's live event stream.
#[async_trait]
pub trait LifecycleEventSource: Send + Sync {
    async fn subscribe(&self) -> Result<LifecycleEventStream, RuntimeError>;
}
