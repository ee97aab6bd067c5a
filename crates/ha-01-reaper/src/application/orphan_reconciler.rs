//! Orphan Reconciler
//!
//! Runs one reconciliation pass per metadata change notification. Passes are
//! self-contained: each fetches fresh host and container snapshots, so several
//! may overlap without corrupting each other. Two overlapping passes can both
//! try to remove the same container; the second attempt is a no-op on the
//! runtime side.

use std::sync::Arc;

use shared_types::MetadataContainer;
use tracing::{debug, error, info};

use crate::config::ReaperConfig;
use crate::domain::errors::{ReaperError, ReaperResult};
use crate::domain::orphan::{find_orphans, OrphanReason};
use crate::ports::outbound::{ContainerRuntime, MetadataSource};

/// What happened to one orphan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrphanOutcome {
    /// Runtime container force-removed.
    Removed,
    /// Runtime container is the agent itself; left alone.
    ReservedAgent,
    /// No runtime id to act on.
    NoExternalId,
    /// Inspect failed; nothing removed.
    InspectFailed,
    /// Remove was attempted and failed.
    RemoveFailed,
}

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    /// Metadata version that triggered the pass.
    pub version: String,
    /// Metadata containers scheduled on this host.
    pub on_host: usize,
    /// `(external_id, outcome)` for every orphan, in metadata order.
    pub outcomes: Vec<(String, OrphanOutcome)>,
}

impl PassReport {
    /// External ids that were removed.
    pub fn removed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == OrphanOutcome::Removed)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Removes runtime containers whose identity label no longer matches the
/// metadata record that created them.
pub struct OrphanReconciler {
    runtime: Arc<dyn ContainerRuntime>,
    metadata: Arc<dyn MetadataSource>,
    config: Arc<ReaperConfig>,
}

impl OrphanReconciler {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        metadata: Arc<dyn MetadataSource>,
        config: Arc<ReaperConfig>,
    ) -> Self {
        Self {
            runtime,
            metadata,
            config,
        }
    }

    /// Change-notification entry point. Pass-level failures are logged and
    /// dropped; the next notification starts fresh.
    pub async fn on_metadata_change(&self, version: &str) {
        if let Err(e) = self.reconcile(version).await {
            error!(version, error = %e, "reaper: Failed to watch for orphan containers");
        }
    }

    /// Run one pass and report what was done.
    ///
    /// Returns `Err` only when the self host or the container list cannot be
    /// fetched; in that case nothing is removed.
    pub async fn reconcile(&self, version: &str) -> ReaperResult<PassReport> {
        let host = self
            .metadata
            .get_self_host()
            .await
            .map_err(ReaperError::SelfHost)?;
        let containers = self
            .metadata
            .get_containers()
            .await
            .map_err(ReaperError::MetadataContainers)?;

        let on_host = containers.iter().filter(|c| c.is_on_host(&host)).count();
        let orphans = find_orphans(
            &host,
            &containers,
            &self.config.uuid_label,
            self.config.treat_missing_label_as_orphan,
        );

        debug!(
            version,
            host = %host.uuid,
            on_host,
            orphans = orphans.len(),
            "reaper: Reconciliation pass"
        );

        let mut outcomes = Vec::with_capacity(orphans.len());
        for (container, reason) in orphans {
            let outcome = self.remove_orphan(container, &reason).await;
            outcomes.push((container.external_id.clone(), outcome));
        }

        Ok(PassReport {
            version: version.to_string(),
            on_host,
            outcomes,
        })
    }

    async fn remove_orphan(
        &self,
        container: &MetadataContainer,
        reason: &OrphanReason,
    ) -> OrphanOutcome {
        let id = container.external_id.as_str();
        if id.is_empty() {
            debug!(name = %container.name, uuid = %container.uuid, "reaper: Orphan has no external id");
            return OrphanOutcome::NoExternalId;
        }

        let details = match self.runtime.inspect_container(id).await {
            Ok(details) => details,
            Err(source) => {
                let e = ReaperError::Inspect {
                    id: id.to_string(),
                    source,
                };
                error!(container_id = id, error = %e, "reaper: Inspect failed");
                return OrphanOutcome::InspectFailed;
            }
        };

        if details.name == self.config.reserved_agent_name {
            debug!(container_id = id, "reaper: Skipping agent container");
            return OrphanOutcome::ReservedAgent;
        }

        info!(
            name = %container.name,
            container_id = id,
            reason = ?reason,
            "reaper: Removing unmanaged container"
        );
        match self.runtime.remove_container(id, true).await {
            Ok(()) => OrphanOutcome::Removed,
            Err(source) => {
                let e = ReaperError::Remove {
                    id: id.to_string(),
                    source,
                };
                error!(container_id = id, error = %e, "reaper: Remove failed");
                OrphanOutcome::RemoveFailed
            }
        }
    }
}
