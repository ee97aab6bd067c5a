//! Ports module for the Reaper
//!
//! Defines the outbound (SPI) port traits the reaper drives. Adapters for a
//! concrete runtime and metadata service live in the agent runtime.

pub mod outbound;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use outbound::{ContainerRuntime, MetadataSource};
