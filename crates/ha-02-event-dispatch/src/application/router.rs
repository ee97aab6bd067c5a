//! # Event Router
//!
//! A bounded listener channel feeding a fixed-size worker pool. Each event is
//! looked up in the routing table and its handler list runs, in order, on one
//! worker. Different events run concurrently, so no ordering holds across
//! events.
//!
//! Two tasks are started:
//!
//! - **forwarder**: runtime event stream → listener
//! - **dispatcher**: listener → worker pool
//!
//! Anything else (the startup replay) can push into the listener through
//! `RouterHandle::listener`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use shared_types::LifecycleEvent;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::domain::errors::DispatchError;
use crate::domain::routing::RoutingTable;
use crate::ports::outbound::{EventHandler, LifecycleEventSource, LifecycleEventStream};

/// Router before `start`.
pub struct EventRouter {
    routes: Arc<RoutingTable>,
    listener: mpsc::Sender<LifecycleEvent>,
    inbox: mpsc::Receiver<LifecycleEvent>,
    workers: Arc<Semaphore>,
    worker_pool_size: usize,
}

impl EventRouter {
    /// `buffer_size` bounds the listener channel; `worker_pool_size` bounds
    /// concurrent handler chains.
    pub fn new(
        buffer_size: usize,
        worker_pool_size: usize,
        routes: RoutingTable,
    ) -> Result<Self, DispatchError> {
        if buffer_size == 0 {
            return Err(DispatchError::InvalidPoolSize(buffer_size));
        }
        if worker_pool_size == 0 {
            return Err(DispatchError::InvalidPoolSize(worker_pool_size));
        }

        let (listener, inbox) = mpsc::channel(buffer_size);
        Ok(Self {
            routes: Arc::new(routes),
            listener,
            inbox,
            workers: Arc::new(Semaphore::new(worker_pool_size)),
            worker_pool_size,
        })
    }

    /// Ingestion point; events sent here are dispatched once the router runs.
    pub fn listener(&self) -> mpsc::Sender<LifecycleEvent> {
        self.listener.clone()
    }

    /// Subscribe to `source` and begin dispatching.
    ///
    /// Consumes the router, so a router can only be started once.
    pub async fn start(
        self,
        source: &dyn LifecycleEventSource,
        shutdown: watch::Receiver<bool>,
    ) -> Result<RouterHandle, DispatchError> {
        let stream = source.subscribe().await.map_err(DispatchError::Subscribe)?;

        let handled = Arc::new(AtomicU64::new(0));
        let dropped = Arc::new(AtomicU64::new(0));

        let forwarder = tokio::spawn(forward(stream, self.listener.clone(), shutdown.clone()));
        let dispatcher = tokio::spawn(dispatch(
            self.inbox,
            Arc::clone(&self.routes),
            Arc::clone(&self.workers),
            Arc::clone(&handled),
            Arc::clone(&dropped),
            shutdown,
        ));

        info!(
            workers = self.worker_pool_size,
            routes = self.routes.len(),
            "events: Event router started"
        );

        Ok(RouterHandle {
            listener: self.listener,
            workers: self.workers,
            worker_pool_size: self.worker_pool_size,
            handled,
            dropped,
            forwarder,
            dispatcher,
        })
    }
}

/// A running router.
pub struct RouterHandle {
    listener: mpsc::Sender<LifecycleEvent>,
    workers: Arc<Semaphore>,
    worker_pool_size: usize,
    handled: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
    forwarder: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

impl RouterHandle {
    pub fn listener(&self) -> mpsc::Sender<LifecycleEvent> {
        self.listener.clone()
    }

    /// Events whose handler chain has completed.
    pub fn events_handled(&self) -> u64 {
        self.handled.load(Ordering::SeqCst)
    }

    /// Events dropped because no handler is routed for their status.
    pub fn events_dropped(&self) -> u64 {
        self.dropped.load(Ordering::SeqCst)
    }

    /// Wait for both router tasks to exit and in-flight chains to finish.
    ///
    /// Only returns after shutdown has been signalled (or the event stream
    /// ended and every listener sender is gone).
    pub async fn join(self) {
        let Self {
            listener,
            workers,
            worker_pool_size,
            forwarder,
            dispatcher,
            ..
        } = self;
        drop(listener);

        if let Err(e) = forwarder.await {
            error!(error = %e, "events: Forwarder task failed");
        }
        if let Err(e) = dispatcher.await {
            error!(error = %e, "events: Dispatcher task failed");
        }
        let _drained = workers.acquire_many(worker_pool_size as u32).await;
        info!("events: Event router stopped");
    }
}

async fn forward(
    mut stream: LifecycleEventStream,
    listener: mpsc::Sender<LifecycleEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            item = stream.next() => match item {
                Some(Ok(event)) => {
                    if listener.send(event).await.is_err() {
                        debug!("events: Listener closed, forwarder exiting");
                        break;
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "events: Skipping bad runtime event");
                }
                None => {
                    warn!("events: Runtime event stream ended");
                    break;
                }
            },
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}

async fn dispatch(
    mut inbox: mpsc::Receiver<LifecycleEvent>,
    routes: Arc<RoutingTable>,
    workers: Arc<Semaphore>,
    handled: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        let event = tokio::select! {
            event = inbox.recv() => match event {
                Some(event) => event,
                None => break,
            },
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
        };

        let handlers = routes.handlers_for(&event.status).to_vec();
        if handlers.is_empty() {
            debug!(
                container_id = %event.id,
                status = %event.status,
                "events: No handlers for status"
            );
            dropped.fetch_add(1, Ordering::SeqCst);
            continue;
        }

        let permit = match Arc::clone(&workers).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        let handled = Arc::clone(&handled);
        tokio::spawn(async move {
            run_chain(&handlers, &event).await;
            handled.fetch_add(1, Ordering::SeqCst);
            drop(permit);
        });
    }
}

/// Run every handler in order. A failing handler is logged and the chain
/// continues.
async fn run_chain(handlers: &[Arc<dyn EventHandler>], event: &LifecycleEvent) {
    for handler in handlers {
        if let Err(e) = handler.handle(event).await {
            error!(
                handler = handler.name(),
                container_id = %event.id,
                status = %event.status,
                source = event.source.as_str(),
                error = %e,
                "events: Handler failed"
            );
        }
    }
}
