//! Structural comparison of two completed scans' results.
//!
//! A pure read-side query: nothing here touches storage or mutates
//! either scan. Inputs are the persisted per-target summaries, outputs
//! are deterministic (sorted by endpoint id, port, and service string).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::results::ServiceInfo;
use crate::types::DbId;

/// The slice of one persisted scan result that comparison operates on.
#[derive(Debug, Clone)]
pub struct ComparableResult {
    pub endpoint_id: DbId,
    pub open_ports: Vec<u16>,
    pub os_detection: Option<String>,
    pub services: Vec<ServiceInfo>,
}

/// Direction of a service-list change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceChangeKind {
    Added,
    Removed,
}

impl ServiceChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }
}

impl std::fmt::Display for ServiceChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in a target's service-list diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceChange {
    /// Stable string form of the service tuple.
    pub service: String,
    pub status: ServiceChangeKind,
}

/// Field-level differences for one endpoint present in both scans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDiff {
    pub endpoint_id: DbId,
    /// Ports open in B but not in A.
    pub ports_added: Vec<u16>,
    /// Ports open in A but not in B.
    pub ports_removed: Vec<u16>,
    pub os_changed: bool,
    pub os_before: Option<String>,
    pub os_after: Option<String>,
    pub service_changes: Vec<ServiceChange>,
}

impl TargetDiff {
    /// Whether anything actually differs for this endpoint.
    pub fn has_changes(&self) -> bool {
        !self.ports_added.is_empty()
            || !self.ports_removed.is_empty()
            || self.os_changed
            || !self.service_changes.is_empty()
    }
}

/// The full comparison of two scans' result sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanDiff {
    /// Per-endpoint diffs for endpoints present in both result sets.
    pub targets: Vec<TargetDiff>,
    /// Endpoints with a result only in scan A; excluded from field diffs.
    pub only_in_a: Vec<DbId>,
    /// Endpoints with a result only in scan B; excluded from field diffs.
    pub only_in_b: Vec<DbId>,
}

/// Compare two result sets keyed by endpoint identity.
pub fn compare(a: &[ComparableResult], b: &[ComparableResult]) -> ScanDiff {
    let by_endpoint_a: BTreeMap<DbId, &ComparableResult> =
        a.iter().map(|r| (r.endpoint_id, r)).collect();
    let by_endpoint_b: BTreeMap<DbId, &ComparableResult> =
        b.iter().map(|r| (r.endpoint_id, r)).collect();

    let mut targets = Vec::new();
    let mut only_in_a = Vec::new();
    let mut only_in_b = Vec::new();

    let all_endpoints: BTreeSet<DbId> = by_endpoint_a
        .keys()
        .chain(by_endpoint_b.keys())
        .copied()
        .collect();

    for endpoint_id in all_endpoints {
        match (by_endpoint_a.get(&endpoint_id), by_endpoint_b.get(&endpoint_id)) {
            (Some(result_a), Some(result_b)) => {
                targets.push(diff_target(endpoint_id, result_a, result_b));
            }
            (Some(_), None) => only_in_a.push(endpoint_id),
            (None, Some(_)) => only_in_b.push(endpoint_id),
            (None, None) => unreachable!("endpoint came from one of the two maps"),
        }
    }

    ScanDiff {
        targets,
        only_in_a,
        only_in_b,
    }
}

fn diff_target(
    endpoint_id: DbId,
    a: &ComparableResult,
    b: &ComparableResult,
) -> TargetDiff {
    let ports_a: BTreeSet<u16> = a.open_ports.iter().copied().collect();
    let ports_b: BTreeSet<u16> = b.open_ports.iter().copied().collect();

    let ports_added: Vec<u16> = ports_b.difference(&ports_a).copied().collect();
    let ports_removed: Vec<u16> = ports_a.difference(&ports_b).copied().collect();

    let services_a: BTreeSet<String> =
        a.services.iter().map(ServiceInfo::stable_key).collect();
    let services_b: BTreeSet<String> =
        b.services.iter().map(ServiceInfo::stable_key).collect();

    let mut service_changes = Vec::new();
    for service in services_a.union(&services_b) {
        let in_a = services_a.contains(service);
        let in_b = services_b.contains(service);
        if in_a && !in_b {
            service_changes.push(ServiceChange {
                service: service.clone(),
                status: ServiceChangeKind::Removed,
            });
        } else if !in_a && in_b {
            service_changes.push(ServiceChange {
                service: service.clone(),
                status: ServiceChangeKind::Added,
            });
        }
    }

    TargetDiff {
        endpoint_id,
        ports_added,
        ports_removed,
        os_changed: a.os_detection != b.os_detection,
        os_before: a.os_detection.clone(),
        os_after: b.os_detection.clone(),
        service_changes,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
