//! Metadata Change Watcher
//!
//! Long-polls the metadata version and hands every new version to the
//! `OrphanReconciler`. Passes run on spawned tasks, at most
//! `change_concurrency` at a time; when all slots are busy the watcher waits
//! for one before dispatching the next version.
//!
//! A pass is also dispatched when `recheck_interval` elapses without one, so
//! drift introduced outside the metadata service is still caught.

use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::application::orphan_reconciler::OrphanReconciler;
use crate::config::ReaperConfig;
use crate::ports::outbound::MetadataSource;

/// Version the watcher starts from; any real version differs from it.
pub const INITIAL_VERSION: &str = "init";

/// Drives reconciliation passes from metadata change notifications.
pub struct ChangeWatcher {
    metadata: Arc<dyn MetadataSource>,
    reconciler: Arc<OrphanReconciler>,
    config: Arc<ReaperConfig>,
}

impl ChangeWatcher {
    pub fn new(
        metadata: Arc<dyn MetadataSource>,
        reconciler: Arc<OrphanReconciler>,
        config: Arc<ReaperConfig>,
    ) -> Self {
        Self {
            metadata,
            reconciler,
            config,
        }
    }

    /// Watch until `shutdown` fires, then wait for in-flight passes.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let slots = self.config.change_concurrency.max(1);
        let permits = Arc::new(Semaphore::new(slots));
        let mut version = INITIAL_VERSION.to_string();
        let mut last_pass = Instant::now();

        info!(concurrency = slots, "reaper: Metadata change watcher started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let waited = tokio::select! {
                result = self.metadata.wait_for_version(&version, self.config.change_wait) => result,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            };

            match waited {
                Ok(new_version) if new_version != version => {
                    version = new_version;
                    if !self.dispatch(&permits, &version, &mut shutdown).await {
                        break;
                    }
                    last_pass = Instant::now();
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "reaper: Failed to wait for metadata version");
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.change_wait) => {}
                        changed = shutdown.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                    }
                }
            }

            if last_pass.elapsed() >= self.config.recheck_interval {
                debug!(version = %version, "reaper: Periodic recheck");
                if !self.dispatch(&permits, &version, &mut shutdown).await {
                    break;
                }
                last_pass = Instant::now();
            }
        }

        // In-flight passes finish; they are never aborted mid-removal.
        let _drained = permits.acquire_many(slots as u32).await;
        info!("reaper: Metadata change watcher stopped");
    }

    /// Spawn one pass once a slot is free. Returns false on shutdown.
    async fn dispatch(
        &self,
        permits: &Arc<Semaphore>,
        version: &str,
        shutdown: &mut watch::Receiver<bool>,
    ) -> bool {
        let permit = tokio::select! {
            permit = Arc::clone(permits).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return false,
            },
            _ = shutdown.changed() => return false,
        };

        let reconciler = Arc::clone(&self.reconciler);
        let version = version.to_string();
        tokio::spawn(async move {
            reconciler.on_metadata_change(&version).await;
            drop(permit);
        });
        true
    }
}
