//! # Host Agent Runtime Library
//!
//! Exposes the runtime's modules for the binary and for tests.
//!
//! ## Modular Structure
//!
//! - `container/` - Command-line / environment configuration
//! - `adapters/` - Docker Engine and metadata service port implementations
//! - `handlers/` - Default lifecycle event handlers
//! - `wiring/` - Subsystem startup and shutdown
//!
//! ## Startup Sequence
//!
//! 1. Parse and validate configuration
//! 2. Initialize logging
//! 3. Connect adapters
//! 4. Spawn the reaper loops (change watcher, duplicate guard)
//! 5. Start the event router and replay existing containers
//! 6. Wait for SIGINT / SIGTERM, then drain

pub mod adapters;
pub mod container;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod wiring;

pub use container::AgentConfig;
pub use error::AgentError;
pub use wiring::{AgentPorts, AgentRuntime};
