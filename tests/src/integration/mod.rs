//! # Integration Tests
//!
//! Both subsystems running inside one `AgentRuntime` against an
//! `InMemoryHost`.

pub mod host_flows;
