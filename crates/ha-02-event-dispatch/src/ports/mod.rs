//! Ports module for Event Dispatch
//!
//! Outbound traits for the runtime (listing and live events) and for the
//! handlers the router drives.

pub mod outbound;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use outbound::{ContainerLister, EventHandler, LifecycleEventSource, LifecycleEventStream};
