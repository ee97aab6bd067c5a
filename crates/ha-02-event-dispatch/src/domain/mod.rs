//! Domain layer for the Event Dispatch Subsystem

pub mod errors;
pub mod routing;
