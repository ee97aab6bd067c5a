//! Configuration for the Reaper Subsystem

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ReaperError;

/// Label carrying the orchestrator UUID of a container.
pub const DEFAULT_UUID_LABEL: &str = "io.rancher.container.uuid";

/// Label carrying the stack/service name of a container.
pub const DEFAULT_SERVICE_NAME_LABEL: &str = "io.rancher.stack_service.name";

/// Metadata service singleton.
pub const METADATA_SERVICE: &str = "network-services/metadata";

/// DNS service singleton.
pub const DNS_SERVICE: &str = "network-services/metadata/dns";

/// Runtime name of the orchestration agent's own container.
pub const RESERVED_AGENT_NAME: &str = "/rancher-agent";

/// Ramp for the duplicate-service poll loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PollSchedule {
    /// First delay between ticks.
    pub initial: Duration,
    /// Upper bound; the delay stays here once reached.
    pub ceiling: Duration,
    /// Growth factor applied after every tick.
    pub factor: f64,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            ceiling: Duration::from_secs(5 * 60),
            factor: 1.5,
        }
    }
}

impl PollSchedule {
    pub fn validate(&self) -> Result<(), ReaperError> {
        if self.initial.is_zero() {
            return Err(ReaperError::Config(
                "poll initial interval must be non-zero".to_string(),
            ));
        }
        if self.ceiling < self.initial {
            return Err(ReaperError::Config(format!(
                "poll ceiling {:?} is below initial interval {:?}",
                self.ceiling, self.initial
            )));
        }
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err(ReaperError::Config(format!(
                "poll factor must be >= 1.0, got {}",
                self.factor
            )));
        }
        Ok(())
    }
}

/// Reaper configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReaperConfig {
    /// Label holding the orchestrator UUID on runtime containers
    pub uuid_label: String,
    /// Label holding the service name on runtime containers
    pub service_name_label: String,
    /// Services allowed at most one running instance per host
    pub singleton_services: Vec<String>,
    /// Runtime name that is never removed
    pub reserved_agent_name: String,
    /// Maximum reconciliation passes in flight at once
    pub change_concurrency: usize,
    /// Long-poll window for metadata version changes; also the retry delay
    /// after a failed wait
    pub change_wait: Duration,
    /// Run a reconciliation pass at least this often even without changes
    pub recheck_interval: Duration,
    /// Duplicate-service poll ramp
    pub dedup_poll: PollSchedule,
    /// Treat a metadata container without the uuid label as an orphan
    pub treat_missing_label_as_orphan: bool,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            uuid_label: DEFAULT_UUID_LABEL.to_string(),
            service_name_label: DEFAULT_SERVICE_NAME_LABEL.to_string(),
            singleton_services: vec![METADATA_SERVICE.to_string(), DNS_SERVICE.to_string()],
            reserved_agent_name: RESERVED_AGENT_NAME.to_string(),
            change_concurrency: 5,
            change_wait: Duration::from_secs(5),
            recheck_interval: Duration::from_secs(5 * 60),
            dedup_poll: PollSchedule::default(),
            treat_missing_label_as_orphan: true,
        }
    }
}

impl ReaperConfig {
    /// Reject values the loops cannot run with.
    pub fn validate(&self) -> Result<(), ReaperError> {
        if self.change_concurrency == 0 {
            return Err(ReaperError::Config(
                "change_concurrency must be at least 1".to_string(),
            ));
        }
        if self.change_wait.is_zero() {
            return Err(ReaperError::Config(
                "change_wait must be non-zero".to_string(),
            ));
        }
        if self.uuid_label.is_empty() || self.service_name_label.is_empty() {
            return Err(ReaperError::Config("label keys must be non-empty".to_string()));
        }
        self.dedup_poll.validate()
    }
}
