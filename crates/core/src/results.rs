//! Normalization of raw host reports into the stable result schema.
//!
//! Raw tool output varies by scan type; [`normalize_report`] reduces it
//! to one summary shape that the result rows, the comparison engine,
//! and API consumers all share. The raw report is carried along under
//! `details`, keyed by address, for consumers that need the full data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::report::HostReport;
use crate::scan::ScanType;

/// Port state that counts as open in the summary.
pub const PORT_STATE_OPEN: &str = "open";

/// The standardized result for one (scan, target) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub summary: ScanSummary,
    /// Raw per-host report passthrough, keyed by scanned address.
    pub details: Map<String, Value>,
}

/// Cross-type result summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSummary {
    pub open_ports: Vec<u16>,
    pub detected_os: Option<DetectedOs>,
    pub services: Vec<ServiceInfo>,
    pub vulnerabilities: Vec<VulnFinding>,
}

/// Best-ranked OS match surfaced for an os-detection scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedOs {
    pub name: String,
    pub accuracy: u8,
    #[serde(rename = "type")]
    pub os_type: String,
}

/// A service entry. Only emitted when both product and version are
/// known; a bare service name is not enough to be useful downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub port: u16,
    pub name: String,
    pub product: String,
    pub version: String,
}

impl ServiceInfo {
    /// Stable string form used when diffing service lists.
    pub fn stable_key(&self) -> String {
        format!("{}/{} {} {}", self.port, self.name, self.product, self.version)
    }
}

/// One vulnerability-script finding. The output is the script's raw
/// text, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnFinding {
    pub name: String,
    pub output: String,
}

/// Reduce one host report to the standardized summary/details shape.
///
/// - A port appears in `open_ports` iff its state is `"open"`.
/// - A service entry is emitted only when product and version are both
///   present.
/// - `detected_os` is filled only for os-detection scans, from the
///   first (best-ranked) OS match.
/// - `vulnerabilities` is filled only for vulnerability scans, one
///   entry per script finding (host-level and port-level).
pub fn normalize_report(report: &HostReport, scan_type: ScanType) -> NormalizedResult {
    let mut summary = ScanSummary::default();

    for port in &report.ports {
        if port.state != PORT_STATE_OPEN {
            continue;
        }
        summary.open_ports.push(port.port);

        if let Some(service) = &port.service {
            if let (Some(product), Some(version)) = (&service.product, &service.version) {
                summary.services.push(ServiceInfo {
                    port: port.port,
                    name: service.name.clone(),
                    product: product.clone(),
                    version: version.clone(),
                });
            }
        }
    }

    if scan_type == ScanType::OsDetection {
        summary.detected_os = report.os_matches.first().map(|m| DetectedOs {
            name: m.name.clone(),
            accuracy: m.accuracy,
            os_type: m.os_type.clone().unwrap_or_else(|| "unknown".to_string()),
        });
    }

    if scan_type == ScanType::VulnerabilityScan {
        for script in report
            .host_scripts
            .iter()
            .chain(report.ports.iter().flat_map(|p| p.scripts.iter()))
        {
            summary.vulnerabilities.push(VulnFinding {
                name: script.id.clone(),
                output: script.output.clone(),
            });
        }
    }

    let mut details = Map::new();
    details.insert(
        report.address.clone(),
        serde_json::to_value(report).unwrap_or(Value::Null),
    );

    NormalizedResult { summary, details }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{OsMatchReport, PortReport, ScriptReport, ServiceReport};

    fn port(port: u16, state: &str, service: Option<ServiceReport>) -> PortReport {
        PortReport {
            protocol: "tcp".to_string(),
            port,
            state: state.to_string(),
            service,
            scripts: Vec::new(),
        }
    }

    fn sample_report() -> HostReport {
        HostReport {
            address: "10.0.0.5".to_string(),
            state: "up".to_string(),
            ports: vec![
                port(
                    22,
                    "open",
                    Some(ServiceReport {
                        name: "ssh".to_string(),
                        product: Some("OpenSSH".to_string()),
                        version: Some("9.6p1".to_string()),
                    }),
                ),
                port(
                    80,
                    "open",
                    Some(ServiceReport {
                        name: "http".to_string(),
                        product: Some("nginx".to_string()),
                        version: None,
                    }),
                ),
                port(443, "filtered", None),
            ],
            os_matches: vec![
                OsMatchReport {
                    name: "Linux 5.X".to_string(),
                    accuracy: 96,
                    os_type: Some("general purpose".to_string()),
                },
                OsMatchReport {
                    name: "Linux 4.X".to_string(),
                    accuracy: 90,
                    os_type: None,
                },
            ],
            host_scripts: vec![ScriptReport {
                id: "smb-vuln-ms17-010".to_string(),
                output: "VULNERABLE".to_string(),
            }],
        }
    }

    #[test]
    fn only_open_ports_are_counted() {
        let result = normalize_report(&sample_report(), ScanType::PortScan);
        assert_eq!(result.summary.open_ports, vec![22, 80]);
    }

    #[test]
    fn service_requires_product_and_version() {
        let result = normalize_report(&sample_report(), ScanType::PortScan);
        // Port 80 has a product but no version, so only ssh qualifies.
        assert_eq!(result.summary.services.len(), 1);
        assert_eq!(result.summary.services[0].port, 22);
        assert_eq!(result.summary.services[0].product, "OpenSSH");
    }

    #[test]
    fn best_ranked_os_match_only_for_os_detection() {
        let result = normalize_report(&sample_report(), ScanType::OsDetection);
        let os = result.summary.detected_os.expect("os match");
        assert_eq!(os.name, "Linux 5.X");
        assert_eq!(os.accuracy, 96);
        assert_eq!(os.os_type, "general purpose");

        let port_scan = normalize_report(&sample_report(), ScanType::PortScan);
        assert!(port_scan.summary.detected_os.is_none());
    }

    #[test]
    fn vulnerabilities_only_for_vulnerability_scans() {
        let result = normalize_report(&sample_report(), ScanType::VulnerabilityScan);
        assert_eq!(result.summary.vulnerabilities.len(), 1);
        assert_eq!(result.summary.vulnerabilities[0].name, "smb-vuln-ms17-010");
        assert_eq!(result.summary.vulnerabilities[0].output, "VULNERABLE");

        let port_scan = normalize_report(&sample_report(), ScanType::PortScan);
        assert!(port_scan.summary.vulnerabilities.is_empty());
    }

    #[test]
    fn details_carries_raw_report_keyed_by_address() {
        let result = normalize_report(&sample_report(), ScanType::PortScan);
        let raw = result.details.get("10.0.0.5").expect("details entry");
        assert_eq!(raw["state"], "up");
        assert_eq!(raw["ports"][0]["port"], 22);
    }

    #[test]
    fn service_stable_key_format() {
        let service = ServiceInfo {
            port: 22,
            name: "ssh".to_string(),
            product: "OpenSSH".to_string(),
            version: "9.6p1".to_string(),
        };
        assert_eq!(service.stable_key(), "22/ssh OpenSSH 9.6p1");
    }
}
