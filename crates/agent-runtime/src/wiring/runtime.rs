//! # Agent Runtime
//!
//! Owns the shutdown channel and every long-running task.
//!
//! ## Shutdown Sequence
//!
//! 1. Signal shutdown to all loops and the router
//! 2. Wait (up to the drain timeout) for loops, router tasks and in-flight
//!    handler chains / reconciliation passes

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use ha_01_reaper::{ChangeWatcher, DuplicateServiceGuard, OrphanReconciler};
use ha_02_event_dispatch::{EventBootstrap, HandlerRegistry, RouterHandle};

use crate::container::AgentConfig;
use crate::error::AgentError;
use crate::wiring::ports::AgentPorts;

/// The host agent.
pub struct AgentRuntime {
    config: AgentConfig,
    ports: AgentPorts,
    handlers: HandlerRegistry,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
    loops: Vec<JoinHandle<()>>,
    router: Option<RouterHandle>,
}

impl AgentRuntime {
    pub fn new(config: AgentConfig, ports: AgentPorts, handlers: HandlerRegistry) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            config,
            ports,
            handlers,
            shutdown_tx,
            shutdown_rx,
            loops: Vec::new(),
            router: None,
        }
    }

    /// Start the event router and replay, then the reaper loops.
    ///
    /// The router is listening before the reaper can act, so removals and
    /// stops it makes reach the handlers as live events. A failed bootstrap
    /// is returned to the caller with nothing left running.
    pub async fn start(&mut self) -> Result<(), AgentError> {
        info!("===========================================");
        info!("  Host Agent v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        if self.config.disable_events {
            info!("events: Disabled by configuration");
        } else {
            let bootstrap = EventBootstrap::new(
                Arc::clone(&self.ports.lister),
                Arc::clone(&self.ports.events),
                self.config.dispatch_config(),
            );
            match bootstrap
                .start(self.config.pool_size, &self.handlers, self.shutdown_rx.clone())
                .await
            {
                Ok(router) => self.router = Some(router),
                Err(e) => {
                    self.signal_shutdown();
                    return Err(e.into());
                }
            }
        }

        if self.config.disable_reaper {
            info!("reaper: Disabled by configuration");
        } else if let Err(e) = self.start_reaper() {
            self.signal_shutdown();
            return Err(e);
        }

        info!(
            reaper = !self.config.disable_reaper,
            events = !self.config.disable_events,
            "Host agent running"
        );
        Ok(())
    }

    fn start_reaper(&mut self) -> Result<(), AgentError> {
        let config = self.config.reaper_config();
        config.validate()?;
        let config = Arc::new(config);

        let reconciler = Arc::new(OrphanReconciler::new(
            Arc::clone(&self.ports.runtime),
            Arc::clone(&self.ports.metadata),
            Arc::clone(&config),
        ));
        let watcher = ChangeWatcher::new(
            Arc::clone(&self.ports.metadata),
            reconciler,
            Arc::clone(&config),
        );
        let guard = DuplicateServiceGuard::new(Arc::clone(&self.ports.runtime), config);

        let shutdown = self.shutdown_rx.clone();
        self.loops
            .push(tokio::spawn(async move { watcher.run(shutdown).await }));
        let shutdown = self.shutdown_rx.clone();
        self.loops
            .push(tokio::spawn(async move { guard.run(shutdown).await }));
        Ok(())
    }

    fn signal_shutdown(&self) {
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
    }

    /// Receiver that flips to `true` once shutdown begins.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// The running router, if events are enabled and started.
    pub fn router(&self) -> Option<&RouterHandle> {
        self.router.as_ref()
    }

    /// Stop everything. Returns false when the drain timeout expired first.
    pub async fn shutdown(self) -> bool {
        info!("Initiating graceful shutdown...");
        self.signal_shutdown();

        let Self {
            config,
            loops,
            router,
            ..
        } = self;

        let drain = async move {
            for task in loops {
                if let Err(e) = task.await {
                    error!(error = %e, "Background loop failed");
                }
            }
            if let Some(router) = router {
                router.join().await;
            }
        };

        match tokio::time::timeout(config.drain_timeout(), drain).await {
            Ok(()) => {
                info!("Shutdown complete");
                true
            }
            Err(_) => {
                warn!(
                    timeout_secs = config.drain_timeout_secs,
                    "Drain timeout expired, exiting with work in flight"
                );
                false
            }
        }
    }
}
