//! # Test Fakes
//!
//! `InMemoryHost` models one host: a container runtime whose mutations emit
//! lifecycle events, plus the metadata service's view of that host. It
//! implements every outbound port of both subsystems, so removals made by the
//! reaper show up as events in the dispatcher.

pub mod host;

pub use host::InMemoryHost;
