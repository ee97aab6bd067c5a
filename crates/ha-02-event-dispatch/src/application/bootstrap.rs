//! # Event Bootstrap
//!
//! Starts the router and replays the existing container population as
//! synthetic events, so handlers attached at boot observe containers that
//! started before the agent did.
//!
//! The router is listening before the listing is taken: a container that
//! starts in between is seen live and may also be replayed. Handlers must
//! tolerate a duplicate `start`.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::info;

use shared_types::LifecycleEvent;

use crate::application::router::{EventRouter, RouterHandle};
use crate::config::DispatchConfig;
use crate::domain::errors::DispatchError;
use crate::domain::routing::{HandlerRegistry, RoutingTable};
use crate::ports::outbound::{ContainerLister, LifecycleEventSource};

/// Wires the standard routing table to the runtime and performs the replay.
pub struct EventBootstrap {
    lister: Arc<dyn ContainerLister>,
    source: Arc<dyn LifecycleEventSource>,
    config: DispatchConfig,
}

impl EventBootstrap {
    pub fn new(
        lister: Arc<dyn ContainerLister>,
        source: Arc<dyn LifecycleEventSource>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            lister,
            source,
            config,
        }
    }

    /// Start a router with `pool_size` listener slots and workers, then replay
    /// every container (running or not) once.
    ///
    /// Any failure is returned as-is; a half-started dispatcher is not useful.
    pub async fn start(
        &self,
        pool_size: usize,
        registry: &HandlerRegistry,
        shutdown: watch::Receiver<bool>,
    ) -> Result<RouterHandle, DispatchError> {
        let routes = RoutingTable::standard(registry);
        let router = EventRouter::new(pool_size, pool_size, routes)?;
        let handle = router.start(self.source.as_ref(), shutdown).await?;

        let replayed = self.replay(&handle.listener()).await?;
        info!(replayed, "events: Replayed existing containers");

        Ok(handle)
    }

    /// Push one synthetic event per listed container into `listener`.
    pub async fn replay(
        &self,
        listener: &mpsc::Sender<LifecycleEvent>,
    ) -> Result<usize, DispatchError> {
        let containers = self
            .lister
            .list_containers(true)
            .await
            .map_err(DispatchError::ListContainers)?;

        for container in &containers {
            let event =
                LifecycleEvent::synthetic(container.id.clone(), self.config.synthetic_status.clone());
            listener
                .send(event)
                .await
                .map_err(|_| DispatchError::RouterClosed)?;
        }

        Ok(containers.len())
    }
}
