//! Orphan detection
//!
//! A metadata container scheduled on this host is expected to carry a uuid
//! label equal to its own UUID. A missing or different label means the
//! runtime object behind `external_id` was superseded and never cleaned up.

use shared_types::{MetadataContainer, SelfHost};

/// Why a container was classified as an orphan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrphanReason {
    /// The uuid label is absent.
    MissingLabel,
    /// The uuid label names a different container.
    Mismatch { label: String },
}

/// Classify a single metadata container.
///
/// Returns `None` when the identity label matches.
pub fn orphan_reason(
    container: &MetadataContainer,
    uuid_label: &str,
    treat_missing_as_orphan: bool,
) -> Option<OrphanReason> {
    match container.label(uuid_label) {
        None if treat_missing_as_orphan => Some(OrphanReason::MissingLabel),
        None => None,
        Some(label) if label == container.uuid => None,
        Some(label) => Some(OrphanReason::Mismatch {
            label: label.to_string(),
        }),
    }
}

/// Orphans among `containers` that belong to `host`, in input order.
pub fn find_orphans<'a>(
    host: &SelfHost,
    containers: &'a [MetadataContainer],
    uuid_label: &str,
    treat_missing_as_orphan: bool,
) -> Vec<(&'a MetadataContainer, OrphanReason)> {
    containers
        .iter()
        .filter(|c| c.is_on_host(host))
        .filter_map(|c| {
            orphan_reason(c, uuid_label, treat_missing_as_orphan).map(|reason| (c, reason))
        })
        .collect()
}
