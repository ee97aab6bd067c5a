//! # Host Flows
//!
//! ```text
//! InMemoryHost ──metadata──→ ChangeWatcher ──→ OrphanReconciler ──remove──┐
//!      ↑                                                                  │
//!      └──────────────── die / destroy events ←───────────────────────────┘
//!                                   │
//!                                   ↓
//!                         EventRouter → network handler
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use agent_runtime::{AgentConfig, AgentPorts, AgentRuntime};
    use ha_02_event_dispatch::ports::mocks::{CallLog, RecordingHandler};
    use ha_02_event_dispatch::HandlerRegistry;
    use shared_types::{EventSource, EventStatus};

    use crate::fakes::InMemoryHost;

    const UUID: &str = "io.rancher.container.uuid";
    const SERVICE: &str = "io.rancher.stack_service.name";
    const METADATA_SERVICE: &str = "network-services/metadata";
    const DNS_SERVICE: &str = "network-services/metadata/dns";
    const WAIT: Duration = Duration::from_secs(3);

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn agent(host: &Arc<InMemoryHost>, log: &CallLog) -> AgentRuntime {
        let ports = AgentPorts {
            runtime: host.clone(),
            lister: host.clone(),
            events: host.clone(),
            metadata: host.clone(),
        };
        let handlers = HandlerRegistry {
            binexec_watcher: Arc::new(RecordingHandler::new("binexec", log.clone())),
            start_handler: Arc::new(RecordingHandler::new("start", log.clone())),
            network_manager: Arc::new(RecordingHandler::new("network", log.clone())),
        };
        let config = AgentConfig {
            drain_timeout_secs: 5,
            ..Default::default()
        };
        AgentRuntime::new(config, ports, handlers)
    }

    async fn eventually(check: impl Fn() -> bool) -> bool {
        let poll = async {
            while !check() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(WAIT, poll).await.is_ok()
    }

    fn network_saw(log: &CallLog, id: &str, status: EventStatus) -> bool {
        log.events_for("network")
            .iter()
            .any(|event| event.id == id && event.status == status)
    }

    // =========================================================================
    // REAPER → DISPATCHER
    // =========================================================================

    #[tokio::test]
    async fn test_removed_orphan_reaches_network_handler_as_die() {
        let host = Arc::new(InMemoryHost::new("H"));
        host.run("d1", "/web-1", &[]);
        host.schedule("a1", "d1", &[(UUID, "a2")]);
        let log = CallLog::default();

        let mut agent = agent(&host, &log);
        agent.start().await.unwrap();

        assert!(eventually(|| host.container_ids().is_empty()).await);
        assert!(eventually(|| network_saw(&log, "d1", EventStatus::Die)).await);

        let die = log
            .events_for("network")
            .into_iter()
            .find(|event| event.status == EventStatus::Die)
            .unwrap();
        assert!(matches!(die.source, EventSource::Runtime(_)));
        assert!(agent.shutdown().await);
    }

    #[tokio::test]
    async fn test_agent_container_survives_reconciliation() {
        let host = Arc::new(InMemoryHost::new("H"));
        host.run("d0", "/rancher-agent", &[]);
        host.run("d1", "/web-1", &[]);
        host.schedule("a0", "d0", &[(UUID, "stale")]);
        host.schedule("a1", "d1", &[(UUID, "stale")]);
        let log = CallLog::default();

        let mut agent = agent(&host, &log);
        agent.start().await.unwrap();

        assert!(eventually(|| host.container_ids() == vec!["d0".to_string()]).await);
        assert!(agent.shutdown().await);
    }

    #[tokio::test]
    async fn test_matching_containers_untouched() {
        let host = Arc::new(InMemoryHost::new("H"));
        host.run("d1", "/web-1", &[]);
        host.schedule("a1", "d1", &[(UUID, "a1")]);
        let log = CallLog::default();

        let mut agent = agent(&host, &log);
        agent.start().await.unwrap();

        assert!(log.wait_for(3, WAIT).await);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(host.container_ids(), vec!["d1".to_string()]);
        assert!(!network_saw(&log, "d1", EventStatus::Die));
        assert!(agent.shutdown().await);
    }

    #[tokio::test]
    async fn test_metadata_change_triggers_new_pass() {
        let host = Arc::new(InMemoryHost::new("H"));
        host.run("d1", "/web-1", &[]);
        host.schedule("a1", "d1", &[(UUID, "a1")]);
        let log = CallLog::default();

        let mut agent = agent(&host, &log);
        agent.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(host.container_ids(), vec!["d1".to_string()]);

        // d2 shows up, then its record is superseded.
        host.run("d2", "/web-2", &[]);
        host.schedule("a2", "d2", &[(UUID, "a3")]);

        assert!(eventually(|| host.container_ids() == vec!["d1".to_string()]).await);
        assert!(eventually(|| network_saw(&log, "d2", EventStatus::Start)).await);
        assert!(eventually(|| network_saw(&log, "d2", EventStatus::Die)).await);
        assert!(agent.shutdown().await);
    }

    // =========================================================================
    // DUPLICATE GUARD → DISPATCHER
    // =========================================================================

    #[tokio::test]
    async fn test_oldest_duplicate_stopped_and_reported() {
        let host = Arc::new(InMemoryHost::new("H"));
        host.run("m1", "/metadata-1", &[(UUID, "u1"), (SERVICE, METADATA_SERVICE)]);
        host.run("m2", "/metadata-2", &[(UUID, "u2"), (SERVICE, METADATA_SERVICE)]);
        host.run("n1", "/dns-1", &[(UUID, "u3"), (SERVICE, DNS_SERVICE)]);
        let log = CallLog::default();

        let mut agent = agent(&host, &log);
        agent.start().await.unwrap();

        assert!(eventually(|| host.running_ids() == vec!["n1".to_string(), "m2".to_string()]).await);
        assert!(eventually(|| network_saw(&log, "m1", EventStatus::Die)).await);
        assert_eq!(host.stops(), vec![("m1".to_string(), Duration::ZERO)]);
        assert!(agent.shutdown().await);
    }

    // =========================================================================
    // STARTUP REPLAY
    // =========================================================================

    #[tokio::test]
    async fn test_replay_covers_containers_started_before_agent() {
        let host = Arc::new(InMemoryHost::new("H"));
        host.add_exited("c1", "/job-1");
        host.run("c2", "/web-1", &[]);
        let log = CallLog::default();

        let mut agent = agent(&host, &log);
        agent.start().await.unwrap();

        assert!(log.wait_for(6, WAIT).await);
        let mut replayed: Vec<String> = log
            .events_for("start")
            .into_iter()
            .filter(|event| event.is_synthetic())
            .map(|event| event.id)
            .collect();
        replayed.sort();
        assert_eq!(replayed, vec!["c1".to_string(), "c2".to_string()]);

        host.run("c3", "/web-2", &[]);
        assert!(log.wait_for(9, WAIT).await);
        assert_eq!(log.handlers_for("c3"), vec!["binexec", "start", "network"]);
        assert!(agent.shutdown().await);
    }
}
