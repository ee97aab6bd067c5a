//! # Subsystem Wiring
//!
//! ```text
//!                      ┌────────────── AgentRuntime ──────────────┐
//!                      │                                          │
//! metadata service ──→ │ ChangeWatcher ──→ OrphanReconciler ──┐   │
//!                      │                                      ├──→│──→ Docker
//!                      │ DuplicateServiceGuard ───────────────┘   │
//!                      │                                          │
//! Docker events ─────→ │ EventRouter ──→ handlers                 │
//!                      │     ↑                                    │
//!                      │ EventBootstrap (replay)                  │
//!                      └──────────────────────────────────────────┘
//! ```

pub mod ports;
pub mod runtime;

pub use ports::AgentPorts;
pub use runtime::AgentRuntime;
