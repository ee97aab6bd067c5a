//! # HA-01: Reaper Subsystem
//!
//! Keeps the containers running on this host consistent with the metadata
//! service.
//!
//! ## Architecture
//!
//! - **Domain**: Orphan detection, duplicate selection, poll interval ramp
//! - **Ports**: Outbound (`ContainerRuntime`, `MetadataSource`)
//! - **Application**: `OrphanReconciler`, `DuplicateServiceGuard`, `ChangeWatcher`
//!
//! ## Failure Modes Addressed
//!
//! ```text
//! metadata change ──→ ChangeWatcher ──(≤ 5 in flight)──→ OrphanReconciler
//!                                                          │ inspect / remove
//!                                                          ▼
//!                                                    container runtime
//!                                                          ▲
//! ramping timer ──→ DuplicateServiceGuard ─── list / stop ─┘
//! ```
//!
//! The two loops share no state. Removal and stop are idempotent on the
//! runtime side, so overlapping passes need no coordination.

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{
    ChangeWatcher, DedupReport, DuplicateServiceGuard, OrphanOutcome, OrphanReconciler,
    PassReport,
};
pub use config::{PollSchedule, ReaperConfig};
pub use domain::duplicates::{select_duplicates, DuplicateInstance};
pub use domain::errors::{ReaperError, ReaperResult};
pub use domain::orphan::{find_orphans, OrphanReason};
pub use domain::poll_interval::PollInterval;
pub use ports::outbound::{ContainerRuntime, MetadataSource};
