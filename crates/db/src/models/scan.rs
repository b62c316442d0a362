//! Scan, scan target, and scan result entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vigil_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `scans` table.
///
/// `parameters` holds the normalized parameter map. It is written once
/// at creation and never changes after execution starts. `started_at`
/// and `completed_at` are each set at most once, by the guarded status
/// transitions in `ScanRepo`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Scan {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub scan_type: String,
    pub parameters: serde_json::Value,
    pub status_id: StatusId,
    pub scheduled_at: Option<Timestamp>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for `POST /api/v1/scans`.
#[derive(Debug, Deserialize)]
pub struct CreateScan {
    pub name: String,
    #[serde(rename = "type")]
    pub scan_type: String,
    /// Raw user parameters; normalized before storage.
    pub parameters: Option<serde_json::Value>,
    /// Endpoint ids to scan. Must be non-empty and free of duplicates.
    pub target_endpoints: Vec<DbId>,
}

/// Query parameters for `GET /api/v1/scans`.
#[derive(Debug, Default, Deserialize)]
pub struct ScanListQuery {
    /// Filter by status name (e.g. `"running"`).
    pub status: Option<String>,
    /// Filter by scan type (e.g. `"port-scan"`).
    #[serde(rename = "type")]
    pub scan_type: Option<String>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// A row from the `scan_targets` table. The target set is fixed at scan
/// creation and immutable thereafter.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScanTarget {
    pub id: DbId,
    pub scan_id: DbId,
    pub endpoint_id: DbId,
}

/// A row from the `scan_results` table. One per (scan, target) pair
/// that completed execution; a failed target simply has no row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScanResult {
    pub id: DbId,
    pub scan_id: DbId,
    pub endpoint_id: DbId,
    /// Normalized result (`{ summary, details }`).
    pub raw_results: serde_json::Value,
    /// Derived counter: number of open ports in the summary.
    pub open_ports: i32,
    /// Derived counter: number of vulnerability findings in the summary.
    pub vulnerabilities: i32,
    /// Best-ranked OS label, when the scan detected one.
    pub os_detection: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a scan result.
#[derive(Debug)]
pub struct CreateScanResult {
    pub scan_id: DbId,
    pub endpoint_id: DbId,
    pub raw_results: serde_json::Value,
    pub open_ports: i32,
    pub vulnerabilities: i32,
    pub os_detection: Option<String>,
}
