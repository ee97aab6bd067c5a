//! Routing table: event status → ordered handler list.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use shared_types::EventStatus;

use crate::ports::outbound::EventHandler;

/// Handlers the standard table is assembled from.
#[derive(Clone)]
pub struct HandlerRegistry {
    /// Watches containers that ship agent binaries.
    pub binexec_watcher: Arc<dyn EventHandler>,
    /// Per-container start bookkeeping.
    pub start_handler: Arc<dyn EventHandler>,
    /// Network attachment; sees both starts and deaths.
    pub network_manager: Arc<dyn EventHandler>,
}

/// Mapping from status to the handlers that run, in order, for it.
#[derive(Clone, Default)]
pub struct RoutingTable {
    routes: HashMap<EventStatus, Vec<Arc<dyn EventHandler>>>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard table:
    ///
    /// - `start` → binexec watcher, start handler, network manager
    /// - `die`   → network manager
    pub fn standard(registry: &HandlerRegistry) -> Self {
        Self::new()
            .route(
                EventStatus::Start,
                vec![
                    Arc::clone(&registry.binexec_watcher),
                    Arc::clone(&registry.start_handler),
                    Arc::clone(&registry.network_manager),
                ],
            )
            .route(EventStatus::Die, vec![Arc::clone(&registry.network_manager)])
    }

    /// Replace the handler list for `status`.
    pub fn route(mut self, status: EventStatus, handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        self.routes.insert(status, handlers);
        self
    }

    /// Handlers for `status`; empty when the status is not routed.
    pub fn handlers_for(&self, status: &EventStatus) -> &[Arc<dyn EventHandler>] {
        self.routes.get(status).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_routed(&self, status: &EventStatus) -> bool {
        !self.handlers_for(status).is_empty()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl fmt::Debug for RoutingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (status, handlers) in &self.routes {
            let names: Vec<&str> = handlers.iter().map(|h| h.name()).collect();
            map.entry(&status.as_str(), &names);
        }
        map.finish()
    }
}
