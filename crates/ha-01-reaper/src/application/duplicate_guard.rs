//! Duplicate Service Guard
//!
//! Independent poll loop that hard-stops surplus instances of singleton
//! infrastructure services (metadata, DNS). The delay between ticks ramps
//! from the schedule's initial value to its ceiling and stays there.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::config::ReaperConfig;
use crate::domain::duplicates::{select_duplicates, DuplicateInstance};
use crate::domain::errors::{ReaperError, ReaperResult};
use crate::domain::poll_interval::PollInterval;
use crate::ports::outbound::ContainerRuntime;

/// Dedup stops never wait for a graceful exit.
pub const DEDUP_GRACE_PERIOD: Duration = Duration::ZERO;

/// Summary of one detection pass.
#[derive(Debug, Clone, Default)]
pub struct DedupReport {
    /// Instances that were selected for stopping.
    pub selected: Vec<DuplicateInstance>,
    /// Container ids whose stop call succeeded.
    pub stopped: Vec<String>,
    /// Container ids whose stop call failed.
    pub failed: Vec<String>,
}

/// Stops extra running instances of singleton services.
pub struct DuplicateServiceGuard {
    runtime: Arc<dyn ContainerRuntime>,
    config: Arc<ReaperConfig>,
}

impl DuplicateServiceGuard {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, config: Arc<ReaperConfig>) -> Self {
        Self { runtime, config }
    }

    /// One detection pass: list, select the oldest surplus instance per
    /// service, stop it with zero grace.
    pub async fn check_once(&self) -> ReaperResult<DedupReport> {
        let containers = self
            .runtime
            .list_containers(true)
            .await
            .map_err(ReaperError::ListContainers)?;

        let selected = select_duplicates(
            &containers,
            &self.config.uuid_label,
            &self.config.service_name_label,
            &self.config.singleton_services,
        );

        let mut report = DedupReport {
            selected: selected.clone(),
            ..Default::default()
        };

        for duplicate in selected {
            info!(
                container_id = %duplicate.container_id,
                service = %duplicate.service,
                running = duplicate.running_instances,
                "reaper: Stopping duplicate metadata/dns service"
            );
            match self
                .runtime
                .stop_container(&duplicate.container_id, DEDUP_GRACE_PERIOD)
                .await
            {
                Ok(()) => report.stopped.push(duplicate.container_id),
                Err(source) => {
                    let e = ReaperError::Stop {
                        id: duplicate.container_id.clone(),
                        source,
                    };
                    error!(error = %e, "reaper: Failed to stop duplicate metadata/dns service");
                    report.failed.push(duplicate.container_id);
                }
            }
        }

        Ok(report)
    }

    /// Poll until `shutdown` flips to true (or its sender is dropped).
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = PollInterval::new(self.config.dedup_poll.clone());
        info!("reaper: Duplicate service guard started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = self.check_once().await {
                error!(error = %e, "reaper: Failed to check for bad metadata");
            }

            let delay = interval.next_delay();
            debug!(delay_ms = delay.as_millis() as u64, "reaper: Next duplicate check");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("reaper: Duplicate service guard stopped");
    }
}
