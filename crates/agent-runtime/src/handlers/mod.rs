//! # Event Handlers
//!
//! Default occupants of the three routing slots. Deployments that manage
//! binaries, per-container state or networking plug their own handlers into
//! a `HandlerRegistry` instead.

pub mod logging;

pub use logging::TracingHandler;
