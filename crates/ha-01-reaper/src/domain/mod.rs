//! Domain layer for the Reaper
//!
//! Pure decision logic: which metadata records are orphans, which running
//! instances are surplus, and how long to wait between dedup ticks. Nothing
//! here talks to the runtime or the metadata service.

pub mod duplicates;
pub mod errors;
pub mod orphan;
pub mod poll_interval;

pub use duplicates::{select_duplicates, DuplicateInstance};
pub use errors::{ReaperError, ReaperResult};
pub use orphan::{find_orphans, OrphanReason};
pub use poll_interval::PollInterval;
