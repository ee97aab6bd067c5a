//! Singleton service dedup selection
//!
//! Runtime listings come back newest first, so for a service with more than
//! one running instance the last match is the oldest one. That instance is
//! the one to stop; the next tick re-evaluates whatever is left.

use shared_types::RuntimeContainerSummary;

/// A running instance selected for stopping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateInstance {
    /// Well-known service name.
    pub service: String,
    /// Runtime id of the oldest running instance.
    pub container_id: String,
    /// Running instances seen for the service in this listing.
    pub running_instances: usize,
}

/// Pick at most one container per singleton service to stop.
///
/// A container counts toward a service when it is running, carries a
/// non-empty uuid label and its service-name label equals the service.
/// Output follows the order of `services`.
pub fn select_duplicates(
    containers: &[RuntimeContainerSummary],
    uuid_label: &str,
    service_name_label: &str,
    services: &[String],
) -> Vec<DuplicateInstance> {
    services
        .iter()
        .filter_map(|service| {
            let matches: Vec<&RuntimeContainerSummary> = containers
                .iter()
                .filter(|c| c.state.is_running())
                .filter(|c| c.label(uuid_label).is_some_and(|uuid| !uuid.is_empty()))
                .filter(|c| c.label(service_name_label) == Some(service.as_str()))
                .collect();

            if matches.len() < 2 {
                return None;
            }

            matches.last().map(|oldest| DuplicateInstance {
                service: service.clone(),
                container_id: oldest.id.clone(),
                running_instances: matches.len(),
            })
        })
        .collect()
}
