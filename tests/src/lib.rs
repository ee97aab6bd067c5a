//! # Host-Agent Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/fakes/        # In-memory host shared by both subsystems
//! ├── src/integration/  # Reaper + dispatcher against one host
//! └── benches/          # Domain rule throughput
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ha-tests
//! cargo bench -p ha-tests
//! ```

pub mod fakes;
pub mod integration;
