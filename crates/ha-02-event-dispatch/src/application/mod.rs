//! Application layer for Event Dispatch

pub mod bootstrap;
pub mod router;

pub use bootstrap::EventBootstrap;
pub use router::{EventRouter, RouterHandle};
