//! Application layer for the Reaper
//!
//! Services that drive the domain rules against the outbound ports.

pub mod change_watcher;
pub mod duplicate_guard;
pub mod orphan_reconciler;

pub use change_watcher::ChangeWatcher;
pub use duplicate_guard::{DedupReport, DuplicateServiceGuard};
pub use orphan_reconciler::{OrphanOutcome, OrphanReconciler, PassReport};
