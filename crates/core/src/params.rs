//! Scan parameter validation and defaulting.
//!
//! [`ScanParams::normalize`] is total: whatever the caller submits,
//! every field the argument builder needs comes out populated. Invalid
//! or missing values are replaced by the documented defaults instead of
//! being rejected, and the normalized set is what gets persisted on the
//! scan row, so stored parameters are always complete and auditable.

use serde_json::{json, Value};

use crate::scan::{ScanIntensity, ScanSpeed, ScanType};

/// Default per-probe timeout in seconds (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: i64 = 300;

/// Lower clamp for the timeout parameter.
pub const MIN_TIMEOUT_SECS: i64 = 30;

/// Upper clamp for the timeout parameter (1 hour).
pub const MAX_TIMEOUT_SECS: i64 = 3600;

/// Default port range for port scans.
pub const DEFAULT_PORT_RANGE: &str = "1-1000";

/// Default ports for OS detection: common services that maximize
/// fingerprinting accuracy.
pub const DEFAULT_OS_DETECTION_PORTS: &str = "22,80,443";

/// A fully-defaulted, validated parameter set for one scan type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanParams {
    PortScan {
        ports: String,
        speed: ScanSpeed,
        timeout_secs: i64,
    },
    OsDetection {
        ports: String,
        timeout_secs: i64,
    },
    VulnerabilityScan {
        intensity: ScanIntensity,
        timeout_secs: i64,
    },
}

impl ScanParams {
    /// Normalize raw user-supplied parameters for the given scan type.
    ///
    /// Never fails. `raw` may be any JSON value; non-object input is
    /// treated as an empty parameter map.
    ///
    /// - `ports` is passed through verbatim when present as a string
    ///   (no range-syntax validation happens here), otherwise defaulted.
    /// - `speed` / `intensity` fall back to their defaults on
    ///   unrecognized values.
    /// - `timeout` must be a JSON integer and is clamped to
    ///   [[`MIN_TIMEOUT_SECS`], [`MAX_TIMEOUT_SECS`]]; anything else
    ///   becomes [`DEFAULT_TIMEOUT_SECS`].
    pub fn normalize(scan_type: ScanType, raw: &Value) -> Self {
        let timeout_secs = normalize_timeout(raw.get("timeout"));

        match scan_type {
            ScanType::PortScan => Self::PortScan {
                ports: str_param(raw, "ports", DEFAULT_PORT_RANGE),
                speed: ScanSpeed::parse_or_default(
                    raw.get("speed").and_then(Value::as_str),
                ),
                timeout_secs,
            },
            ScanType::OsDetection => Self::OsDetection {
                ports: str_param(raw, "ports", DEFAULT_OS_DETECTION_PORTS),
                timeout_secs,
            },
            ScanType::VulnerabilityScan => Self::VulnerabilityScan {
                intensity: ScanIntensity::parse_or_default(
                    raw.get("intensity").and_then(Value::as_str),
                ),
                timeout_secs,
            },
        }
    }

    /// Re-normalize a stored parameter map.
    ///
    /// Stored parameters were produced by [`normalize`](Self::normalize),
    /// but going through it again means a row edited out-of-band still
    /// yields a complete set.
    pub fn from_stored(scan_type: ScanType, stored: &Value) -> Self {
        Self::normalize(scan_type, stored)
    }

    pub fn scan_type(&self) -> ScanType {
        match self {
            Self::PortScan { .. } => ScanType::PortScan,
            Self::OsDetection { .. } => ScanType::OsDetection,
            Self::VulnerabilityScan { .. } => ScanType::VulnerabilityScan,
        }
    }

    pub fn timeout_secs(&self) -> i64 {
        match self {
            Self::PortScan { timeout_secs, .. }
            | Self::OsDetection { timeout_secs, .. }
            | Self::VulnerabilityScan { timeout_secs, .. } => *timeout_secs,
        }
    }

    /// Render the flat JSON map persisted on the scan row.
    pub fn to_json(&self) -> Value {
        match self {
            Self::PortScan {
                ports,
                speed,
                timeout_secs,
            } => json!({
                "ports": ports,
                "speed": speed.as_str(),
                "timeout": timeout_secs,
            }),
            Self::OsDetection {
                ports,
                timeout_secs,
            } => json!({
                "os_detection": true,
                "ports": ports,
                "timeout": timeout_secs,
            }),
            Self::VulnerabilityScan {
                intensity,
                timeout_secs,
            } => json!({
                "vuln_scan": true,
                "intensity": intensity.as_str(),
                "timeout": timeout_secs,
            }),
        }
    }
}

/// Read a string parameter, defaulting when absent or not a string.
fn str_param(raw: &Value, key: &str, default: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Clamp an integer timeout into the allowed window, defaulting for
/// missing or non-integer input.
fn normalize_timeout(value: Option<&Value>) -> i64 {
    value
        .and_then(Value::as_i64)
        .map(|t| t.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS))
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
