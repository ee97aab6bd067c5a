//! Configuration for the Event Dispatch Subsystem

use serde::{Deserialize, Serialize};
use shared_types::EventStatus;

use crate::domain::errors::DispatchError;

/// Dispatch configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Listener buffer and worker pool size
    pub pool_size: usize,
    /// Status given to replayed events
    pub synthetic_status: EventStatus,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            synthetic_status: EventStatus::Start,
        }
    }
}

impl DispatchConfig {
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.pool_size == 0 {
            return Err(DispatchError::InvalidPoolSize(self.pool_size));
        }
        Ok(())
    }
}
