//! # Shared Types Crate
//!
//! Data model shared by every subsystem of the host agent.
//!
//! ## Design Principles
//!
//! - **Snapshots only**: metadata and runtime records are read-only values
//!   fetched fresh on every pass; nothing here owns mutable state.
//! - **Wire-compatible**: metadata types deserialize straight from the
//!   metadata service JSON so adapters stay thin.
//! - **Narrow errors**: adapters report failures through [`RuntimeError`] and
//!   [`MetadataError`]; subsystems decide whether a failure is pass-level or
//!   item-level.

pub mod entities;
pub mod errors;
pub mod events;

pub use entities::*;
pub use errors::*;
pub use events::*;
