//! Scan type and tuning enums shared across the pipeline.
//!
//! The string forms are part of the external contract: they appear in
//! create requests, the `scans.scan_type` column, and stored parameter
//! maps, so `as_str`/`parse` must stay stable.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The kind of scan to run against each target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanType {
    PortScan,
    OsDetection,
    VulnerabilityScan,
}

impl ScanType {
    /// String representation for display, storage, and request parsing.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PortScan => "port-scan",
            Self::OsDetection => "os-detection",
            Self::VulnerabilityScan => "vulnerability-scan",
        }
    }

    /// Parse a scan type from its wire form.
    ///
    /// Unknown values are a validation error: an unrecognized type must
    /// be rejected before any scan state is created.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "port-scan" => Ok(Self::PortScan),
            "os-detection" => Ok(Self::OsDetection),
            "vulnerability-scan" => Ok(Self::VulnerabilityScan),
            other => Err(CoreError::Validation(format!(
                "Unknown scan type \"{other}\". \
                 Expected one of: port-scan, os-detection, vulnerability-scan"
            ))),
        }
    }
}

impl std::fmt::Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing profile for port scans. Unrecognized input falls back to
/// [`ScanSpeed::Normal`] during parameter normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanSpeed {
    Slow,
    Normal,
    Fast,
}

impl ScanSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Normal => "normal",
            Self::Fast => "fast",
        }
    }

    /// Parse a speed value, falling back to the default for anything
    /// unrecognized.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("slow") => Self::Slow,
            Some("fast") => Self::Fast,
            Some("normal") => Self::Normal,
            _ => Self::Normal,
        }
    }

    /// nmap timing template for this speed.
    pub fn timing_template(&self) -> &'static str {
        match self {
            Self::Slow => "-T2",
            Self::Normal => "-T3",
            Self::Fast => "-T4",
        }
    }
}

/// Depth profile for vulnerability scans. Unrecognized input falls back
/// to [`ScanIntensity::Medium`] during parameter normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanIntensity {
    Light,
    Medium,
    Aggressive,
}

impl ScanIntensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Aggressive => "aggressive",
        }
    }

    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some("light") => Self::Light,
            Some("aggressive") => Self::Aggressive,
            Some("medium") => Self::Medium,
            _ => Self::Medium,
        }
    }

    /// nmap timing template for this intensity.
    pub fn timing_template(&self) -> &'static str {
        match self {
            Self::Light => "-T2",
            Self::Medium => "-T3",
            Self::Aggressive => "-T4",
        }
    }
}
