//! # HA-02: Event Dispatch Subsystem
//!
//! Wires container lifecycle events to an ordered handler pipeline and
//! replays the containers that already exist as synthetic `start` events, so
//! handlers attached at boot see the whole population.
//!
//! ## Architecture
//!
//! - **Domain**: `RoutingTable` (status → ordered handlers), `HandlerRegistry`
//! - **Ports**: Outbound (`EventHandler`, `ContainerLister`, `LifecycleEventSource`)
//! - **Application**: `EventRouter` (listener channel + worker pool), `EventBootstrap`
//!
//! ## Event Flow
//!
//! ```text
//! runtime event stream ──→ forwarder ──┐
//!                                      ▼
//!   bootstrap replay ──────────→ listener (bounded mpsc)
//!                                      │
//!                                      ▼
//!                    dispatcher ── worker permit ──→ handlers[0] → handlers[1] → ...
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{EventBootstrap, EventRouter, RouterHandle};
pub use config::DispatchConfig;
pub use domain::errors::{DispatchError, HandlerError};
pub use domain::routing::{HandlerRegistry, RoutingTable};
pub use ports::outbound::{ContainerLister, EventHandler, LifecycleEventSource, LifecycleEventStream};
