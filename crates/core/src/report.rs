//! Raw per-host scan report model.
//!
//! [`HostReport`] is the structured form of what the scanner emits for
//! one target, before any normalization. It is kept close to the tool's
//! own vocabulary (port states, OS match ranking, script ids) and is
//! persisted verbatim under the `details` side of a normalized result.

use serde::{Deserialize, Serialize};

/// Everything the scanner reported for one host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostReport {
    /// The address the tool actually scanned.
    pub address: String,
    /// Host liveness state as reported by the tool (`"up"`, `"down"`).
    pub state: String,
    /// Per-port findings.
    pub ports: Vec<PortReport>,
    /// OS fingerprint matches, best-ranked first.
    pub os_matches: Vec<OsMatchReport>,
    /// Host-level script results.
    pub host_scripts: Vec<ScriptReport>,
}

/// One scanned port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortReport {
    pub protocol: String,
    pub port: u16,
    /// Port state (`"open"`, `"closed"`, `"filtered"`, ...).
    pub state: String,
    /// Service detection result, when `-sV` identified one.
    pub service: Option<ServiceReport>,
    /// Port-level script results.
    pub scripts: Vec<ScriptReport>,
}

/// Service identification for a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceReport {
    pub name: String,
    /// Product string, when version detection resolved one.
    pub product: Option<String>,
    /// Version string, when version detection resolved one.
    pub version: Option<String>,
}

/// One OS fingerprint match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsMatchReport {
    pub name: String,
    /// Match confidence, 0-100.
    pub accuracy: u8,
    /// OS class (`"general purpose"`, `"router"`, ...), when reported.
    pub os_type: Option<String>,
}

/// Output of one scan script. The output text is tool-defined and
/// treated as opaque; nothing downstream parses it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptReport {
    pub id: String,
    pub output: String,
}
